//! Report types and the fund-report link

use serde::{Deserialize, Serialize};

use core_kernel::{FundoId, RelatorioId};

use crate::validation::{fields, messages, FieldErrors};

/// Maximum length of a report name
pub const NOME_MAX_LENGTH: usize = 100;

/// A report type a fund can produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relatorio {
    pub id: RelatorioId,
    /// Unique name
    pub nome: String,
    pub descricao: Option<String>,
    /// Inactive reports cannot be linked and are hidden from listings
    pub ativo: bool,
}

/// A report to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelatorio {
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default = "default_ativo")]
    pub ativo: bool,
}

fn default_ativo() -> bool {
    true
}

impl NewRelatorio {
    /// Creates an active report with the given name
    pub fn new(nome: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            descricao: None,
            ativo: true,
        }
    }

    /// Sets the description
    pub fn with_descricao(mut self, descricao: impl Into<String>) -> Self {
        self.descricao = Some(descricao.into());
        self
    }

    /// Checks that the name is present and fits its column
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.nome.trim().is_empty() {
            errors.add(fields::NOME, messages::REQUIRED);
        } else if self.nome.chars().count() > NOME_MAX_LENGTH {
            errors.add(
                fields::NOME,
                format!("Ensure this field has no more than {} characters.", NOME_MAX_LENGTH),
            );
        }
        errors.into_result()
    }
}

/// "This fund produces this report"
///
/// The pair is unique; deleting either side deletes the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FundoRelatorio {
    pub fundo: FundoId,
    pub relatorio: RelatorioId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_relatorio_defaults_active() {
        let relatorio = NewRelatorio::new("Multimercados").with_descricao("Relatório de Multimercados");
        assert!(relatorio.ativo);
        assert!(relatorio.validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let errors = NewRelatorio::new("   ").validate().unwrap_err();
        assert!(errors.contains(fields::NOME));
    }

    #[test]
    fn test_deserialize_defaults() {
        let relatorio: NewRelatorio = serde_json::from_str(r#"{"nome":"MM Int'l"}"#).unwrap();
        assert!(relatorio.ativo);
        assert_eq!(relatorio.descricao, None);
    }
}
