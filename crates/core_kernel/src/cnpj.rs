//! CNPJ validation and formatting
//!
//! A CNPJ is the 14-digit Brazilian national registry number for legal
//! entities. The last two digits are check digits computed from the first
//! twelve (and thirteen) with a mod-11 weighted sum.
//!
//! Two independent checks exist:
//!
//! - **Format**: the literal mask `NN.NNN.NNN/NNNN-NN`, enforced on input
//!   boundaries before anything else.
//! - **Checksum**: punctuation is ignored, the digits must be 14 long, not all
//!   identical, and both check digits must match.
//!
//! # Example
//!
//! ```rust
//! use core_kernel::cnpj::{is_formatted_cnpj, is_valid_cnpj};
//!
//! assert!(is_formatted_cnpj("11.222.333/0001-81"));
//! assert!(is_valid_cnpj("11.222.333/0001-81"));
//! assert!(is_valid_cnpj("11222333000181"));
//! assert!(!is_valid_cnpj("11.222.333/0001-82"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CoreError;

/// Number of digits in a CNPJ
pub const CNPJ_LENGTH: usize = 14;

static CNPJ_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$").expect("CNPJ format pattern is valid")
});

/// Returns true when `text` follows the `NN.NNN.NNN/NNNN-NN` mask exactly
pub fn is_formatted_cnpj(text: &str) -> bool {
    CNPJ_FORMAT.is_match(text)
}

/// Extracts the decimal digits of `text`, dropping everything else
pub fn cnpj_digits(text: &str) -> Vec<u32> {
    text.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Validates the CNPJ checksum
///
/// Non-digit characters are ignored, so both masked and bare inputs are
/// accepted. Returns false for anything that is not 14 digits or whose digits
/// are all identical.
pub fn is_valid_cnpj(text: &str) -> bool {
    let digits = cnpj_digits(text);

    if digits.len() != CNPJ_LENGTH {
        return false;
    }

    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let first = check_digit(&digits[..12], 5);
    let second = check_digit(&digits[..13], 6);

    digits[12] == first && digits[13] == second
}

/// Computes one check digit over `digits` with weights starting at `weight`
///
/// Weights decrease by one per position and wrap back to 9 below 2.
fn check_digit(digits: &[u32], mut weight: u32) -> u32 {
    let mut sum = 0;
    for &digit in digits {
        sum += digit * weight;
        weight -= 1;
        if weight < 2 {
            weight = 9;
        }
    }

    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

/// Appends both check digits to a 12-digit CNPJ base and masks the result
///
/// Returns `None` unless `base` holds exactly twelve digits (punctuation is
/// ignored).
pub fn complete_cnpj(base: &str) -> Option<String> {
    let mut digits = cnpj_digits(base);
    if digits.len() != 12 {
        return None;
    }
    digits.push(check_digit(&digits[..12], 5));
    digits.push(check_digit(&digits[..13], 6));

    let raw: String = digits
        .iter()
        .filter_map(|d| char::from_digit(*d, 10))
        .collect();
    Some(format_cnpj(&raw))
}

/// Applies the CNPJ mask to whatever digits `text` contains
///
/// Partial inputs are masked progressively (`"1122"` becomes `"11.22"`);
/// digits beyond the fourteenth are dropped.
pub fn format_cnpj(text: &str) -> String {
    let digits: String = text
        .chars()
        .filter(char::is_ascii_digit)
        .take(CNPJ_LENGTH)
        .collect();

    let mut formatted = String::with_capacity(18);
    for (i, c) in digits.chars().enumerate() {
        match i {
            2 | 5 => formatted.push('.'),
            8 => formatted.push('/'),
            12 => formatted.push('-'),
            _ => {}
        }
        formatted.push(c);
    }
    formatted
}

/// Normalizes a CNPJ into its masked form, rejecting invalid checksums
///
/// Accepts either the masked form or 14 bare digits.
pub fn normalize_cnpj(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if !is_valid_cnpj(trimmed) {
        return Err(CoreError::InvalidCnpj(trimmed.to_string()));
    }
    if is_formatted_cnpj(trimmed) {
        return Ok(trimmed.to_string());
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Ok(format_cnpj(trimmed));
    }
    Err(CoreError::InvalidCnpj(trimmed.to_string()))
}
