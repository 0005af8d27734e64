//! Tests for the CNPJ validator as seen by consumers of core_kernel

use core_kernel::{format_cnpj, is_formatted_cnpj, is_valid_cnpj, normalize_cnpj, CoreError};

const VALID: &[&str] = &[
    "11.222.333/0001-81",
    "12.345.678/0001-95",
    "60.901.234/0001-31",
    "19.376.345/0001-72",
    "98.765.432/0001-98",
];

#[test]
fn test_valid_cnpjs_pass_both_checks() {
    for cnpj in VALID {
        assert!(is_formatted_cnpj(cnpj), "{cnpj} should match the mask");
        assert!(is_valid_cnpj(cnpj), "{cnpj} should pass the checksum");
    }
}

#[test]
fn test_flipping_either_check_digit_fails() {
    for cnpj in VALID {
        let chars: Vec<char> = cnpj.chars().collect();
        for pos in [chars.len() - 2, chars.len() - 1] {
            let mut flipped = chars.clone();
            let digit = flipped[pos].to_digit(10).unwrap();
            flipped[pos] = char::from_digit((digit + 1) % 10, 10).unwrap();
            let flipped: String = flipped.into_iter().collect();
            assert!(!is_valid_cnpj(&flipped), "{flipped} should fail");
        }
    }
}

#[test]
fn test_all_identical_digits_fail_regardless_of_format() {
    assert!(!is_valid_cnpj("00000000000000"));
    assert!(!is_valid_cnpj("11.111.111/1111-11"));
    assert!(!is_valid_cnpj("99999999999999"));
}

#[test]
fn test_checksum_ignores_punctuation() {
    assert!(is_valid_cnpj("11222333000181"));
    assert!(is_valid_cnpj("11 222 333 0001 81"));
    assert!(!is_formatted_cnpj("11222333000181"));
}

#[test]
fn test_format_then_validate() {
    let formatted = format_cnpj("60901234000131");
    assert_eq!(formatted, "60.901.234/0001-31");
    assert!(is_formatted_cnpj(&formatted));
}

#[test]
fn test_normalize_reports_invalid_cnpj() {
    let err = normalize_cnpj("60.901.234/0001-32").unwrap_err();
    assert!(matches!(err, CoreError::InvalidCnpj(ref v) if v == "60.901.234/0001-32"));
}
