//! Field-keyed validation errors
//!
//! Every write rule reports against the field it concerns, so callers can
//! show errors next to the offending input. Errors for several fields are
//! collected in one pass instead of stopping at the first.
//!
//! ```rust
//! use domain_fundo::validation::{FieldErrors, fields};
//!
//! let mut errors = FieldErrors::new();
//! errors.add(fields::ST_CLASSE_FUNDO, "This field is required.");
//! assert!(errors.contains(fields::ST_CLASSE_FUNDO));
//! assert!(errors.into_result().is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Wire names of the validated fields
pub mod fields {
    pub const ST_CNPJ_FUNDO: &str = "st_cnpj_fundo";
    pub const ST_CLASSE_FUNDO: &str = "st_classe_fundo";
    pub const ST_ESTRATEGIA_FUNDO: &str = "st_estrategia_fundo";
    pub const ST_OBS_FUNDO: &str = "st_obs_fundo";
    pub const COD_QUANTUM_FUNDOMASTER: &str = "cod_quantum_fundomaster";
    pub const ST_CNPJ_FUNDOMASTER: &str = "st_cnpj_fundomaster";
    pub const RELATORIOS_IDS: &str = "relatorios_ids";
    pub const NOME: &str = "nome";
}

/// Standard messages shared by the model and the service layer
pub mod messages {
    pub const REQUIRED: &str = "This field is required.";
    pub const NOT_NULL: &str = "This field may not be null.";
    pub const CNPJ_FORMAT: &str = "CNPJ must be in the format XX.XXX.XXX/XXXX-XX.";
    pub const CNPJ_INVALID: &str = "Invalid CNPJ.";
    pub const MASTER_CNPJ_INVALID: &str = "Invalid master fund CNPJ.";
    pub const MASTER_CNPJ_REQUIRED: &str =
        "Master fund CNPJ is required when a master fund code is provided.";
    pub const CNPJ_TAKEN: &str = "A fund with this CNPJ already exists.";
}

/// Validation errors keyed by field name
///
/// Fields are kept in name order so the serialized payload is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set with one message for one field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Adds a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Moves all messages from `other` into this set
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Returns true when no field has an error
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true when `field` has at least one error
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns the messages recorded for `field`
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Iterates over the fields that have errors
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_multiple_fields() {
        let mut errors = FieldErrors::new();
        errors.add(fields::ST_CLASSE_FUNDO, messages::REQUIRED);
        errors.add(fields::ST_CNPJ_FUNDO, messages::CNPJ_INVALID);
        errors.add(fields::ST_CNPJ_FUNDO, messages::CNPJ_TAKEN);

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["st_classe_fundo", "st_cnpj_fundo"]);
        assert_eq!(errors.get(fields::ST_CNPJ_FUNDO).unwrap().len(), 2);
    }

    #[test]
    fn test_merge_and_result() {
        let mut errors = FieldErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.merge(FieldErrors::single(fields::NOME, "bad"));
        assert!(errors.contains(fields::NOME));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_serializes_as_field_map() {
        let errors = FieldErrors::single(fields::RELATORIOS_IDS, "unknown");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "relatorios_ids": ["unknown"] }));
    }

    #[test]
    fn test_display_lists_every_message() {
        let mut errors = FieldErrors::single("a", "one");
        errors.add("b", "two");
        assert_eq!(errors.to_string(), "a: one; b: two");
    }
}
