// domain.rs - Host and base-domain normalization
// Purpose: Reduce raw tool output (URLs, host:port pairs) to bare hostnames
//          and to the two-label base domain used as the URL-gathering key

/// Strip a leading `scheme://`, anything from the first `/`, then the port.
///
/// Total function: an empty input yields an empty hostname.
pub fn normalize_host(input: &str) -> String {
    let host = match input.split_once("://") {
        Some((_, rest)) => rest,
        None => input,
    };
    let host = host.split('/').next().unwrap_or_default();
    host.split(':').next().unwrap_or_default().to_string()
}

/// Last two dot-separated labels of a host (`api.example.com` -> `example.com`).
///
/// Input is normalized first, so full URLs from the prober are accepted.
pub fn base_domain(host: &str) -> String {
    let host = normalize_host(host);
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() > 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host
    }
}
