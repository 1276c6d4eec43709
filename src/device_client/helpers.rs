/// Normalise a configured device address into a base URL without a trailing slash.
/// Bare hosts such as `esp32-relay.local` or `192.168.4.1` get an `http://` scheme.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        assert_eq!(normalize_base_url("esp32-relay.local"), "http://esp32-relay.local");
        assert_eq!(normalize_base_url(" 192.168.4.1/ "), "http://192.168.4.1");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        assert_eq!(normalize_base_url("https://relay.lan/"), "https://relay.lan");
    }

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("http://a/", "/api/relays"), "http://a/api/relays");
        assert_eq!(join_url("http://a", "api/relays"), "http://a/api/relays");
    }
}
