//! Card field checks and display helpers.
//!
//! Everything here is pure. The expiry check reads the local clock only through
//! [`validate_expiry`]; [`validate_expiry_at`] takes the reference date explicitly.

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// `MM/YY` or `YYYY-MM`, months 01-12.
static EXPIRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$|^([0-9]{4})-(0[1-9]|1[0-2])$").expect("expiry regex")
});

static CVC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("cvc regex"));

/// Checks an expiry against today's local date.
pub fn validate_expiry(expiry: &str) -> bool {
    validate_expiry_at(expiry, Local::now().date_naive())
}

/// Checks an expiry against `today`. The current month still counts as valid.
///
/// Two-digit years map to `2000 + YY`, so `MM/YY` cannot express years outside 2000-2099.
pub fn validate_expiry_at(expiry: &str, today: NaiveDate) -> bool {
    let Some(caps) = EXPIRY_RE.captures(expiry) else {
        return false;
    };

    let (year, month) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
        (Some(mm), Some(yy), _, _) => (2000 + parse_digits(yy.as_str()), parse_digits(mm.as_str())),
        (_, _, Some(yyyy), Some(mm)) => (parse_digits(yyyy.as_str()), parse_digits(mm.as_str())),
        _ => return false,
    };

    let current_year = today.year() as u32;
    let current_month = today.month();

    !(year < current_year || (year == current_year && month < current_month))
}

// The regex already guarantees ASCII digits of bounded length.
fn parse_digits(s: &str) -> u32 {
    s.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Exactly three or four ASCII digits. No surrounding whitespace is tolerated.
pub fn validate_cvc(cvc: &str) -> bool {
    CVC_RE.is_match(cvc)
}

/// Removes spaces and hyphens. This is the form a card number is stored and sent in.
pub fn strip_card_number(card_number: &str) -> String {
    card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Groups a card number into blocks of four for display, e.g. `4242 4242 4242 4242`.
///
/// Idempotent: formatting an already formatted number returns it unchanged.
pub fn format_card_number(card_number: &str) -> String {
    group_by_four(&strip_card_number(card_number))
}

/// Keeps the first and last four digits and stars out the rest, grouped for display.
///
/// Numbers of eight characters or fewer are starred out entirely.
pub fn mask_card_number(card_number: &str) -> String {
    let clean: Vec<char> = strip_card_number(card_number).chars().collect();
    let len = clean.len();

    let masked: String = if len <= 8 {
        "*".repeat(len)
    } else {
        clean[..4]
            .iter()
            .chain(std::iter::repeat(&'*').take(len - 8))
            .chain(clean[len - 4..].iter())
            .collect()
    };

    group_by_four(&masked)
}

fn group_by_four(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 15).unwrap()
    }

    #[test]
    fn test_expiry_rejects_past_months() {
        assert!(!validate_expiry_at("01/25", date(2025, 2)));
        assert!(!validate_expiry_at("2024-12", date(2025, 1)));
    }

    #[test]
    fn test_expiry_current_month_is_still_valid() {
        assert!(validate_expiry_at("01/25", date(2025, 1)));
        assert!(validate_expiry_at("2025-01", date(2025, 1)));
    }

    #[test]
    fn test_expiry_two_digit_years_are_this_century() {
        // 12/99 is December 2099, not 1999.
        assert!(validate_expiry_at("12/99", date(2026, 10)));
        assert!(validate_expiry_at("01/99", date(2026, 10)));
        assert!(validate_expiry_at("2099-01", date(2026, 10)));
        assert!(!validate_expiry_at("12/99", date(2100, 1)));
    }

    #[test]
    fn test_expiry_rejects_malformed_input() {
        let today = date(2025, 1);
        for bad in ["13/25", "00/30", "1/30", "12/2030", "2030-13", "2030/12", " 12/30", "12/30 ", ""] {
            assert!(!validate_expiry_at(bad, today), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_expiry_against_wall_clock() {
        assert!(validate_expiry("2099-12"));
        assert!(!validate_expiry("01/00"));
    }

    #[test]
    fn test_cvc() {
        assert!(validate_cvc("123"));
        assert!(validate_cvc("1234"));
        for bad in ["12", "12345", "12a", " 123", "123 ", ""] {
            assert!(!validate_cvc(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_format_groups_by_four() {
        assert_eq!(format_card_number("4242424242424242"), "4242 4242 4242 4242");
        assert_eq!(format_card_number("4242-4242 4242-4"), "4242 4242 4242 4");
        assert_eq!(format_card_number("123"), "123");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn test_format_is_idempotent() {
        for raw in ["4242424242424242", "4000-0566 5566-5556", "378282246310005", "12345"] {
            let once = format_card_number(raw);
            assert_eq!(format_card_number(&once), once);

            let groups: Vec<&str> = once.split(' ').collect();
            let (last, full) = groups.split_last().unwrap();
            assert!(full.iter().all(|g| g.len() == 4));
            assert!(!last.is_empty() && last.len() <= 4);
            assert_eq!(once.trim(), once);
        }
    }

    #[test]
    fn test_strip_removes_separators_only() {
        assert_eq!(strip_card_number("4242 4242-4242 4242"), "4242424242424242");
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask_card_number("4242 4242 4242 4242"), "4242 **** **** 4242");
        assert_eq!(mask_card_number("378282246310005"), "3782 **** ***0 005");
        assert_eq!(mask_card_number("12345678"), "**** ****");
    }
}
