//! Fund DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use core_kernel::{FundoId, RelatorioId};
use domain_fundo::validation::{fields, messages};
use domain_fundo::{FieldErrors, FundoChanges, FundoDetail, FundoFilter, FundoSummary};

use crate::dto::relatorio::RelatorioResponse;

const INTEGER_REQUIRED: &str = "A valid integer is required.";

/// Body of create, full update and partial update
///
/// Optional fields distinguish "absent" (outer `None`, left unchanged) from
/// an explicit `null` (`Some(None)`, cleared). Required fields and the report
/// list reject `null`. The master code and the report list are kept as raw
/// JSON until [`FundoWriteRequest::into_changes`] so type errors are reported
/// against their field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct FundoWriteRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(length(max = 18, message = "Ensure this field has no more than 18 characters."))]
    pub st_cnpj_fundo: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub st_classe_fundo: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub st_estrategia_fundo: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub st_obs_fundo: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub cod_quantum_fundomaster: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub st_cnpj_fundomaster: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub relatorios_ids: Option<Value>,
}

impl FundoWriteRequest {
    /// Checks field shapes and splits the body into changes and report ids
    ///
    /// Every shape problem is collected before returning, one entry per field.
    pub fn into_changes(self) -> Result<(FundoChanges, Option<Vec<RelatorioId>>), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(failures) => to_field_errors(&failures),
        };

        let st_cnpj_fundo = not_null(self.st_cnpj_fundo, fields::ST_CNPJ_FUNDO, &mut errors);
        let st_classe_fundo = not_null(self.st_classe_fundo, fields::ST_CLASSE_FUNDO, &mut errors);
        let st_estrategia_fundo =
            not_null(self.st_estrategia_fundo, fields::ST_ESTRATEGIA_FUNDO, &mut errors);

        let cod_quantum_fundomaster = match self.cod_quantum_fundomaster {
            None => None,
            Some(value) => match parse_integer(&value) {
                Ok(code) => Some(code),
                Err(message) => {
                    errors.add(fields::COD_QUANTUM_FUNDOMASTER, message);
                    None
                }
            },
        };

        let relatorios_ids = match self.relatorios_ids {
            None => None,
            Some(value) => match parse_ids(&value) {
                Ok(ids) => Some(ids),
                Err(message) => {
                    errors.add(fields::RELATORIOS_IDS, message);
                    None
                }
            },
        };

        errors.into_result()?;

        let changes = FundoChanges {
            st_cnpj_fundo,
            st_classe_fundo,
            st_estrategia_fundo,
            st_obs_fundo: self.st_obs_fundo,
            cod_quantum_fundomaster,
            // A blank master CNPJ means "no master"
            st_cnpj_fundomaster: self
                .st_cnpj_fundomaster
                .map(|master| master.filter(|cnpj| !cnpj.trim().is_empty())),
        };
        Ok((changes, relatorios_ids))
    }
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn not_null(value: Option<Option<String>>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match value {
        Some(None) => {
            errors.add(field, messages::NOT_NULL);
            None
        }
        other => other.flatten(),
    }
}

/// Reads a nullable integer given as a JSON number or numeric string
fn parse_integer(value: &Value) -> Result<Option<i32>, String> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(number) => number.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| INTEGER_REQUIRED.to_string())
}

/// Reads a list of report ids given as JSON numbers or numeric strings
fn parse_ids(value: &Value) -> Result<Vec<RelatorioId>, String> {
    let items = match value {
        Value::Null => return Err(messages::NOT_NULL.to_string()),
        Value::Array(items) => items,
        other => {
            return Err(format!(
                "Expected a list of items but got type \"{}\".",
                json_type(other)
            ))
        }
    };

    items
        .iter()
        .map(|item| {
            let id = match item {
                Value::Number(number) => number.as_i64(),
                Value::String(text) => text.trim().parse::<i64>().ok(),
                _ => None,
            };
            id.map(RelatorioId::new).ok_or_else(|| {
                format!("Incorrect type. Expected pk value, received {}.", json_type(item))
            })
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn to_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    for (field, failures) in errors.field_errors() {
        for failure in failures.iter() {
            let message = failure
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| failure.code.to_string());
            fields.add(field.to_string(), message);
        }
    }
    fields
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct FundoQuery {
    pub cnpj: Option<String>,
    pub classe: Option<String>,
    pub estrategia: Option<String>,
    pub relatorio: Option<String>,
    pub search: Option<String>,
}

impl From<FundoQuery> for FundoFilter {
    fn from(query: FundoQuery) -> Self {
        FundoFilter {
            cnpj: query.cnpj,
            classe: query.classe,
            estrategia: query.estrategia,
            relatorio: query.relatorio,
            search: query.search,
        }
    }
}

/// A linked report inside the full fund representation
#[derive(Debug, Serialize)]
pub struct LinkedRelatorio {
    pub relatorio: RelatorioResponse,
}

/// Full fund representation
#[derive(Debug, Serialize)]
pub struct FundoResponse {
    pub id_fundo: FundoId,
    pub st_cnpj_fundo: String,
    pub st_classe_fundo: String,
    pub st_estrategia_fundo: String,
    pub st_obs_fundo: Option<String>,
    pub cod_quantum_fundomaster: Option<i32>,
    pub st_cnpj_fundomaster: Option<String>,
    pub relatorios: Vec<LinkedRelatorio>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FundoDetail> for FundoResponse {
    fn from(detail: FundoDetail) -> Self {
        let fundo = detail.fundo;
        Self {
            id_fundo: fundo.id_fundo,
            st_cnpj_fundo: fundo.st_cnpj_fundo,
            st_classe_fundo: fundo.st_classe_fundo,
            st_estrategia_fundo: fundo.st_estrategia_fundo,
            st_obs_fundo: fundo.st_obs_fundo,
            cod_quantum_fundomaster: fundo.cod_quantum_fundomaster,
            st_cnpj_fundomaster: fundo.st_cnpj_fundomaster,
            relatorios: detail
                .relatorios
                .into_iter()
                .map(|r| LinkedRelatorio { relatorio: r.into() })
                .collect(),
            created_at: fundo.created_at,
            updated_at: fundo.updated_at,
        }
    }
}

/// List representation: no observation, report names only
#[derive(Debug, Serialize)]
pub struct FundoListItem {
    pub id_fundo: FundoId,
    pub st_cnpj_fundo: String,
    pub st_classe_fundo: String,
    pub st_estrategia_fundo: String,
    pub cod_quantum_fundomaster: Option<i32>,
    pub st_cnpj_fundomaster: Option<String>,
    pub relatorios_nomes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FundoSummary> for FundoListItem {
    fn from(summary: FundoSummary) -> Self {
        let fundo = summary.fundo;
        Self {
            id_fundo: fundo.id_fundo,
            st_cnpj_fundo: fundo.st_cnpj_fundo,
            st_classe_fundo: fundo.st_classe_fundo,
            st_estrategia_fundo: fundo.st_estrategia_fundo,
            cod_quantum_fundomaster: fundo.cod_quantum_fundomaster,
            st_cnpj_fundomaster: fundo.st_cnpj_fundomaster,
            relatorios_nomes: summary.relatorios_nomes,
            created_at: fundo.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> Result<(FundoChanges, Option<Vec<RelatorioId>>), FieldErrors> {
        serde_json::from_value::<FundoWriteRequest>(body).unwrap().into_changes()
    }

    #[test]
    fn test_absent_and_null_are_distinct() {
        let (absent, ids) = parse(json!({})).unwrap();
        assert_eq!(absent.st_obs_fundo, None);
        assert_eq!(absent.cod_quantum_fundomaster, None);
        assert_eq!(ids, None);

        let (cleared, ids) = parse(json!({
            "st_obs_fundo": null,
            "cod_quantum_fundomaster": null,
            "relatorios_ids": []
        }))
        .unwrap();
        assert_eq!(cleared.st_obs_fundo, Some(None));
        assert_eq!(cleared.cod_quantum_fundomaster, Some(None));
        assert_eq!(ids, Some(vec![]));
    }

    #[test]
    fn test_blank_master_cnpj_clears_master() {
        let (changes, _) = parse(json!({"st_cnpj_fundomaster": ""})).unwrap();
        assert_eq!(changes.st_cnpj_fundomaster, Some(None));
    }

    #[test]
    fn test_overlong_fields_are_rejected() {
        let errors = parse(json!({
            "st_cnpj_fundo": "1".repeat(19),
            "st_classe_fundo": "x".repeat(101)
        }))
        .unwrap_err();
        assert!(errors.contains(fields::ST_CNPJ_FUNDO));
        assert!(errors.contains(fields::ST_CLASSE_FUNDO));
    }

    #[test]
    fn test_null_required_fields_are_rejected() {
        let errors = parse(json!({
            "st_cnpj_fundo": null,
            "st_classe_fundo": null,
            "st_estrategia_fundo": null,
            "relatorios_ids": null
        }))
        .unwrap_err();
        for field in [
            fields::ST_CNPJ_FUNDO,
            fields::ST_CLASSE_FUNDO,
            fields::ST_ESTRATEGIA_FUNDO,
            fields::RELATORIOS_IDS,
        ] {
            assert_eq!(errors.get(field).unwrap(), [messages::NOT_NULL.to_string()]);
        }
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let (changes, ids) = parse(json!({
            "cod_quantum_fundomaster": "42",
            "relatorios_ids": [1, "2"]
        }))
        .unwrap();
        assert_eq!(changes.cod_quantum_fundomaster, Some(Some(42)));
        assert_eq!(ids, Some(vec![RelatorioId::new(1), RelatorioId::new(2)]));
    }

    #[test]
    fn test_type_errors_are_keyed_by_field() {
        let errors = parse(json!({
            "cod_quantum_fundomaster": "xyz",
            "relatorios_ids": ["abc"]
        }))
        .unwrap_err();
        assert_eq!(
            errors.get(fields::COD_QUANTUM_FUNDOMASTER).unwrap(),
            [INTEGER_REQUIRED.to_string()]
        );
        assert_eq!(
            errors.get(fields::RELATORIOS_IDS).unwrap(),
            ["Incorrect type. Expected pk value, received str.".to_string()]
        );

        let errors = parse(json!({"relatorios_ids": 3, "cod_quantum_fundomaster": 1.5})).unwrap_err();
        assert_eq!(
            errors.get(fields::RELATORIOS_IDS).unwrap(),
            ["Expected a list of items but got type \"number\".".to_string()]
        );
        assert!(errors.contains(fields::COD_QUANTUM_FUNDOMASTER));
    }
}
