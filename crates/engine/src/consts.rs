use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Anything that isn't a letter, digit or whitespace, immediately followed by
// a quote, semicolon, backslash, slash, hyphen or asterisk.
regex!(INJECTION_REGEX, r#"[^\p{L}\p{N}\s]['";\\/*-]"#);

pub(crate) const REPORT_PREFIX: &str = "report-";
pub(crate) const CONSOLIDATED_PREFIX: &str = "final-report-";
pub(crate) const REPORT_EXTENSION: &str = ".json";
