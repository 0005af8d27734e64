//! CSV row layout
//!
//! Expected header:
//! `ST_CNPJ_FUNDO,ST_CLASSE_FUNDO,ST_ESTRATEGIA_FUNDO,ST_OBS_FUNDO,COD_QUANTUM_FUNDOMASTER,ST_CNPJ_FUNDOMASTER,RELATORIOS`

use serde::Deserialize;

use core_kernel::normalize_cnpj;
use domain_fundo::NewFundo;

use crate::error::{ImportError, Result};

/// One fund row, every column kept as raw text
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundoRow {
    #[serde(rename = "ST_CNPJ_FUNDO")]
    pub st_cnpj_fundo: String,
    #[serde(rename = "ST_CLASSE_FUNDO")]
    pub st_classe_fundo: String,
    #[serde(rename = "ST_ESTRATEGIA_FUNDO")]
    pub st_estrategia_fundo: String,
    #[serde(rename = "ST_OBS_FUNDO", default)]
    pub st_obs_fundo: String,
    #[serde(rename = "COD_QUANTUM_FUNDOMASTER", default)]
    pub cod_quantum_fundomaster: String,
    #[serde(rename = "ST_CNPJ_FUNDOMASTER", default)]
    pub st_cnpj_fundomaster: String,
    #[serde(rename = "RELATORIOS", default)]
    pub relatorios: String,
}

impl FundoRow {
    /// Builds the fund attributes
    ///
    /// CNPJs may be masked or 14 bare digits and are stored masked. Empty
    /// optional columns become absent.
    pub fn to_new_fundo(&self) -> Result<NewFundo> {
        let cnpj = normalize_cnpj(&self.st_cnpj_fundo)?;

        let cod_quantum = match non_blank(&self.cod_quantum_fundomaster) {
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| ImportError::InvalidValue {
                column: "COD_QUANTUM_FUNDOMASTER",
                value: raw.to_string(),
            })?),
            None => None,
        };

        let master = non_blank(&self.st_cnpj_fundomaster)
            .map(normalize_cnpj)
            .transpose()?;

        let mut fundo = NewFundo::new(
            cnpj,
            self.st_classe_fundo.trim(),
            self.st_estrategia_fundo.trim(),
        )
        .with_master(cod_quantum, master);
        if let Some(obs) = non_blank(&self.st_obs_fundo) {
            fundo = fundo.with_obs(obs);
        }
        Ok(fundo)
    }

    /// Report names from the semicolon-separated `RELATORIOS` column
    pub fn relatorio_nomes(&self) -> Vec<&str> {
        self.relatorios
            .split(';')
            .map(str::trim)
            .filter(|nome| !nome.is_empty())
            .collect()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FundoRow {
        FundoRow {
            st_cnpj_fundo: "11222333000181".to_string(),
            st_classe_fundo: "Multimercado".to_string(),
            st_estrategia_fundo: " Macro ".to_string(),
            relatorios: "MM Int'l; Multimercados ;;".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_bare_digits_are_masked() {
        let fundo = row().to_new_fundo().unwrap();
        assert_eq!(fundo.st_cnpj_fundo, "11.222.333/0001-81");
        assert_eq!(fundo.st_estrategia_fundo, "Macro");
        assert_eq!(fundo.st_obs_fundo, None);
        assert_eq!(fundo.cod_quantum_fundomaster, None);
    }

    #[test]
    fn test_master_columns() {
        let mut r = row();
        r.cod_quantum_fundomaster = "4321".to_string();
        r.st_cnpj_fundomaster = "12.345.678/0001-95".to_string();
        let fundo = r.to_new_fundo().unwrap();
        assert_eq!(fundo.cod_quantum_fundomaster, Some(4321));
        assert_eq!(fundo.st_cnpj_fundomaster.as_deref(), Some("12.345.678/0001-95"));

        r.cod_quantum_fundomaster = "abc".to_string();
        assert!(matches!(
            r.to_new_fundo(),
            Err(ImportError::InvalidValue { column: "COD_QUANTUM_FUNDOMASTER", .. })
        ));
    }

    #[test]
    fn test_invalid_cnpj_fails_row() {
        let mut r = row();
        r.st_cnpj_fundo = "11.222.333/0001-82".to_string();
        assert!(matches!(r.to_new_fundo(), Err(ImportError::Core(_))));
    }

    #[test]
    fn test_relatorio_names_split_and_trimmed() {
        assert_eq!(row().relatorio_nomes(), vec!["MM Int'l", "Multimercados"]);
        assert!(FundoRow::default().relatorio_nomes().is_empty());
    }
}
