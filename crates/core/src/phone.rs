//! Kenyan mobile number normalization.
//!
//! Every phone number that reaches the gateway or the database goes
//! through [`normalize`] first, so all stored and transmitted numbers
//! share one canonical `+254XXXXXXXXX` form.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::CoreError;

/// Canonical form: `+254` followed by nine digits starting with 7 or 1
/// (Safaricom / Airtel mobile prefixes).
fn canonical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+254[17]\d{8}$").expect("static regex"))
}

/// Normalize a Kenyan mobile number to international format.
///
/// Accepted inputs (whitespace and punctuation are stripped first):
///
/// * `+254712345678` / `254712345678`
/// * `0712345678` / `0112345678`
/// * bare `712345678` / `112345678`
///
/// Anything that does not resolve to a valid mobile number is rejected
/// with [`CoreError::Validation`].
pub fn normalize(phone: &str) -> Result<String, CoreError> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let candidate = if let Some(rest) = digits.strip_prefix("254") {
        format!("+254{rest}")
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+254{rest}")
    } else if digits.starts_with('7') || digits.starts_with('1') {
        format!("+254{digits}")
    } else {
        return Err(CoreError::Validation(format!(
            "Invalid phone number format: {phone}. Expected Kenyan format \
             (e.g. +254712345678 or 0712345678)"
        )));
    };

    if !canonical_re().is_match(&candidate) {
        return Err(CoreError::Validation(format!(
            "Invalid phone number format: {phone}. Expected Kenyan format \
             (e.g. +254712345678 or 0712345678)"
        )));
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_format_is_converted() {
        assert_eq!(normalize("0712345678").unwrap(), "+254712345678");
        assert_eq!(normalize("0112345678").unwrap(), "+254112345678");
    }

    #[test]
    fn international_format_passes_through() {
        assert_eq!(normalize("+254712345678").unwrap(), "+254712345678");
        assert_eq!(normalize("254712345678").unwrap(), "+254712345678");
    }

    #[test]
    fn bare_subscriber_number_gets_country_code() {
        assert_eq!(normalize("712345678").unwrap(), "+254712345678");
    }

    #[test]
    fn whitespace_and_punctuation_are_stripped() {
        assert_eq!(normalize("0712 345 678").unwrap(), "+254712345678");
        assert_eq!(normalize("+254-712-345-678").unwrap(), "+254712345678");
    }

    #[test]
    fn non_mobile_prefix_is_rejected() {
        // landline-style prefix
        assert!(normalize("0212345678").is_err());
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(normalize("07123").is_err());
        assert!(normalize("07123456789").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(normalize("not-a-phone").is_err());
        assert!(normalize("").is_err());
    }
}
