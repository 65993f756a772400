//! NANP phone-number extraction and area-code validation.

use regex::Regex;

use crate::domain::{AreaCode, PhoneNumber};

/// Extract the first phone number from free text, canonicalized to
/// `+1XXXXXXXXXX`.
///
/// Patterns are tried in priority order across the whole text; only the
/// first match of the winning pattern is used.
pub fn extract_number(text: &str) -> Option<PhoneNumber> {
    let patterns = [r"\+1\d{10}", r"1\d{10}", r"\b\d{10}\b"];

    for pattern in patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(m) = re.find(text) {
            return Some(canonicalize(m.as_str()));
        }
    }
    None
}

fn canonicalize(raw: &str) -> PhoneNumber {
    if let Some(rest) = raw.strip_prefix("+1") {
        return PhoneNumber(format!("+1{rest}"));
    }
    if raw.len() == 11 && raw.starts_with('1') {
        return PhoneNumber(format!("+{raw}"));
    }
    PhoneNumber(format!("+1{raw}"))
}

/// Parse a message that is exactly a three-digit area code.
pub fn parse_area_code(text: &str) -> Option<AreaCode> {
    let t = text.trim();
    if t.len() == 3 && t.chars().all(|c| c.is_ascii_digit()) {
        return Some(AreaCode(t.to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_ten_digit_run() {
        let n = extract_number("Call me at 4165551234").unwrap();
        assert_eq!(n.0, "+14165551234");
    }

    #[test]
    fn extracts_plus_one_format() {
        let n = extract_number("+14165551234").unwrap();
        assert_eq!(n.0, "+14165551234");
    }

    #[test]
    fn extracts_eleven_digit_with_trailing_text() {
        let n = extract_number("14165551234 extra text").unwrap();
        assert_eq!(n.0, "+14165551234");
    }

    #[test]
    fn short_number_is_no_match() {
        assert!(extract_number("555-1234").is_none());
    }

    #[test]
    fn only_first_match_is_used() {
        let n = extract_number("+14165551234 or +16475551234").unwrap();
        assert_eq!(n.0, "+14165551234");
    }

    #[test]
    fn area_code_must_be_exactly_three_digits() {
        assert_eq!(parse_area_code("416").unwrap().0, "416");
        assert_eq!(parse_area_code(" 647 ").unwrap().0, "647");
        assert!(parse_area_code("41").is_none());
        assert!(parse_area_code("4165").is_none());
        assert!(parse_area_code("41a").is_none());
    }
}
