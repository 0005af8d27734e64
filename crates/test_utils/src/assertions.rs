//! Assertion helpers for field-keyed API error bodies

use serde_json::Value;

/// Asserts that an API error body lists `field` under `fields`
pub fn assert_json_field_error(body: &Value, field: &str) {
    assert_eq!(
        body["error"], "validation_error",
        "Expected a validation error body, got {}",
        body
    );
    assert!(
        body["fields"].get(field).is_some(),
        "Expected an error on '{}', got {}",
        field,
        body["fields"]
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assert_json_field_error() {
        let body = json!({
            "error": "validation_error",
            "message": "Validation failed",
            "fields": { "relatorios_ids": ["Invalid pk \"3\" - object does not exist."] }
        });
        assert_json_field_error(&body, "relatorios_ids");
    }

    #[test]
    #[should_panic(expected = "Expected an error on")]
    fn test_assert_json_field_error_panics_for_other_field() {
        let body = json!({ "error": "validation_error", "fields": { "st_cnpj_fundo": ["bad"] } });
        assert_json_field_error(&body, "st_classe_fundo");
    }
}
