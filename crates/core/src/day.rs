//! Day-sheet name parsing.
//!
//! The day number is read from the sheet name with a single rule
//! (`[Dd]ia\s*(\d+)`), and sheets that yield a number are keyed by the
//! zero-padded canonical label `Dia NN` so that `Dia 5` and `Dia 05` join.

use regex::Regex;
use std::sync::OnceLock;

fn day_regex() -> &'static Regex {
    static DAY_RE: OnceLock<Regex> = OnceLock::new();
    DAY_RE.get_or_init(|| Regex::new(r"[Dd]ia\s*(\d+)").expect("valid regex"))
}

/// Parse the day-of-month from a sheet name.
pub fn day_number(sheet_name: &str) -> Option<u32> {
    day_regex()
        .captures(sheet_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Canonical day label for a sheet name.
///
/// Names without a parseable day keep the raw sheet name.
pub fn canonical_day_label(sheet_name: &str) -> String {
    match day_number(sheet_name) {
        Some(n) => format!("Dia {n:02}"),
        None => sheet_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_number() {
        assert_eq!(day_number("Dia 05"), Some(5));
        assert_eq!(day_number("Dia5"), Some(5));
        assert_eq!(day_number("dia 17"), Some(17));
        assert_eq!(day_number("Dia 3 (tarde)"), Some(3));
        assert_eq!(day_number("Dia extra"), None);
        assert_eq!(day_number("Consolidado"), None);
    }

    #[test]
    fn test_canonical_label_pads_day() {
        assert_eq!(canonical_day_label("Dia 5"), "Dia 05");
        assert_eq!(canonical_day_label("Dia 05"), "Dia 05");
        assert_eq!(canonical_day_label("Dia  5"), "Dia 05");
        assert_eq!(canonical_day_label("Dia 31"), "Dia 31");
    }

    #[test]
    fn test_unparseable_name_kept_verbatim() {
        assert_eq!(canonical_day_label("Dia extra"), "Dia extra");
    }
}
