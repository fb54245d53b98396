/// Extract a short type name from the full module path.
///
/// Given `"procurement_engine::outlier::IsolationForestDetector"`, returns
/// `"IsolationForestDetector"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Current time as an RFC 3339 string, stamped on every verdict.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_module_path() {
        assert_eq!(short_type_name("a::b::Detector"), "Detector");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn timestamp_parses_back() {
        let ts = timestamp_now();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
