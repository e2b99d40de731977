//! Secret redaction for error messages and log lines.
//!
//! Remote APIs sometimes echo the credential back in an error body
//! ("Incorrect API key provided: sk-..."), so failure reasons are scrubbed
//! before they are printed.

use std::sync::LazyLock;

use regex::Regex;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\bsk-[A-Za-z0-9_\-]{20,})|(\bBearer\s+[A-Za-z0-9\-\._~+/]+=*)").unwrap()
});

/// Replace API keys and bearer tokens with a placeholder.
pub fn redact_secrets(input: &str) -> String {
    API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_api_key_and_bearer() {
        let raw = "Incorrect API key provided: sk-proj-abc123XYZ789def456GHI. Header: Bearer eyJhbGciOiJIUzI1NiJ9";
        let clean = redact_secrets(raw);
        assert!(!clean.contains("sk-proj-abc123XYZ789def456GHI"));
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert_eq!(clean.matches("[REDACTED_TOKEN]").count(), 2);
    }

    #[test]
    fn file_names_containing_sk_dash_survive() {
        for raw in [
            "failed to read /photos/task-20240101.jpg",
            "failed to copy to media/procesadas-ocr/desk-photo-0001-finish.jpg",
            "error processing risk-assessment_2024_lane7.png: HTTP 500",
        ] {
            assert_eq!(redact_secrets(raw), raw);
        }
    }

    #[test]
    fn short_sk_prefix_is_not_a_key() {
        assert_eq!(redact_secrets("sk-123 is a bib"), "sk-123 is a bib");
    }

    #[test]
    fn leaves_numbers_alone() {
        let raw = "error processing bib 555-123-4567.jpg: HTTP 500";
        assert_eq!(redact_secrets(raw), raw);
    }
}
