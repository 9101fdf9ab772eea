use regex::Regex;

pub const REDACTED: &str = "[REDACTED]";

/// Redacts secret-looking substrings from rendered leaf text.
#[derive(Debug, Clone)]
pub struct Scrubber {
    patterns: Vec<Regex>,
}

impl Scrubber {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn default_patterns() -> Vec<Regex> {
        // Keep patterns simple: the Rust `regex` crate doesn't support look-behind.
        let raw = [
            r"sk-[A-Za-z0-9]{10,}",
            r"Bearer\s+[A-Za-z0-9._-]{10,}",
            r"(?i)api[_-]?key\s*[=:]\s*[A-Za-z0-9._-]{10,}",
            r"(?i)password\s*[=:]\s*\S+",
        ];
        raw.into_iter().filter_map(|p| Regex::new(p).ok()).collect()
    }

    pub fn default_shareable() -> Self {
        Self::new(Self::default_patterns())
    }

    /// Compile user patterns on top of the defaults. Invalid patterns are skipped.
    pub fn with_extra_patterns(extra: &[String]) -> Self {
        let mut patterns = Self::default_patterns();
        for raw in extra {
            match Regex::new(raw) {
                Ok(re) => patterns.push(re),
                Err(e) => {
                    tracing::warn!(pattern = %raw, error = %e, "Ignoring invalid redaction pattern");
                }
            }
        }
        Self::new(patterns)
    }

    pub fn scrub_string(&self, input: &str) -> String {
        let mut out = input.to_string();
        for re in &self.patterns {
            out = re.replace_all(&out, REDACTED).into_owned();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_string_redacts_key() {
        let scrubber = Scrubber::default_shareable();
        let out = scrubber.scrub_string("'token=sk-abc1234567890XYZ'");
        assert!(out.contains(REDACTED));
        assert!(!out.contains("sk-abc1234567890XYZ"));
    }

    #[test]
    fn scrub_string_redacts_bearer_header() {
        let scrubber = Scrubber::default_shareable();
        let out = scrubber.scrub_string("'Bearer abcdefghijklmnop'");
        assert_eq!(out, "'[REDACTED]'");
    }

    #[test]
    fn plain_text_is_untouched() {
        let scrubber = Scrubber::default_shareable();
        assert_eq!(scrubber.scrub_string("'John Doe'"), "'John Doe'");
    }

    #[test]
    fn extra_patterns_are_applied_and_invalid_ones_skipped() {
        let scrubber =
            Scrubber::with_extra_patterns(&["ssn-\\d{3}".to_string(), "(unclosed".to_string()]);
        assert_eq!(scrubber.scrub_string("id ssn-123"), "id [REDACTED]");
    }
}
