//! Listing filters
//!
//! Fund filters are case-insensitive substring matches combined with AND.
//! `search` is the exception: it matches if any of CNPJ, class, strategy or
//! observation contains the term, and is then ANDed with the other filters.
//!
//! Adapters translate these filters into their own query language; the
//! [`FundoFilter::matches`] predicate is the reference semantics.

use serde::Deserialize;

use crate::fundo::Fundo;
use crate::relatorio::Relatorio;

/// Filters for the fund listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FundoFilter {
    /// Substring of the fund CNPJ
    pub cnpj: Option<String>,
    /// Substring of the fund class
    pub classe: Option<String>,
    /// Substring of the fund strategy
    pub estrategia: Option<String>,
    /// Substring of any linked report name
    pub relatorio: Option<String>,
    /// Substring of CNPJ, class, strategy or observation
    pub search: Option<String>,
}

impl FundoFilter {
    /// Drops empty terms, which act as "no filter"
    pub fn normalized(self) -> Self {
        Self {
            cnpj: non_empty(self.cnpj),
            classe: non_empty(self.classe),
            estrategia: non_empty(self.estrategia),
            relatorio: non_empty(self.relatorio),
            search: non_empty(self.search),
        }
    }

    /// Returns true when no filter is set
    pub fn is_empty(&self) -> bool {
        self.cnpj.is_none()
            && self.classe.is_none()
            && self.estrategia.is_none()
            && self.relatorio.is_none()
            && self.search.is_none()
    }

    /// Tests a fund and the names of its linked reports against the filter
    pub fn matches(&self, fundo: &Fundo, relatorio_nomes: &[String]) -> bool {
        let field = |term: &Option<String>, value: &str| {
            term.as_deref().map_or(true, |t| contains_ci(value, t))
        };

        if !field(&self.cnpj, &fundo.st_cnpj_fundo)
            || !field(&self.classe, &fundo.st_classe_fundo)
            || !field(&self.estrategia, &fundo.st_estrategia_fundo)
        {
            return false;
        }

        if let Some(term) = self.relatorio.as_deref() {
            if !relatorio_nomes.iter().any(|nome| contains_ci(nome, term)) {
                return false;
            }
        }

        if let Some(term) = self.search.as_deref() {
            let obs = fundo.st_obs_fundo.as_deref().unwrap_or_default();
            return contains_ci(&fundo.st_cnpj_fundo, term)
                || contains_ci(&fundo.st_classe_fundo, term)
                || contains_ci(&fundo.st_estrategia_fundo, term)
                || contains_ci(obs, term);
        }

        true
    }
}

/// Filters for the report listing
///
/// Only active reports are ever listed; `nome` narrows by name substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RelatorioFilter {
    pub nome: Option<String>,
}

impl RelatorioFilter {
    /// Drops an empty name term
    pub fn normalized(self) -> Self {
        Self {
            nome: non_empty(self.nome),
        }
    }

    /// Tests a report against the filter, including the active check
    pub fn matches(&self, relatorio: &Relatorio) -> bool {
        relatorio.ativo
            && self
                .nome
                .as_deref()
                .map_or(true, |term| contains_ci(&relatorio.nome, term))
    }
}

fn non_empty(term: Option<String>) -> Option<String> {
    term.filter(|t| !t.is_empty())
}

/// Case-insensitive substring test
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{FundoId, RelatorioId};
    use proptest::prelude::*;

    fn fundo(classe: &str, estrategia: &str, obs: Option<&str>) -> Fundo {
        let now = Utc::now();
        Fundo {
            id_fundo: FundoId::new(1),
            st_cnpj_fundo: "11.222.333/0001-81".to_string(),
            st_classe_fundo: classe.to_string(),
            st_estrategia_fundo: estrategia.to_string(),
            st_obs_fundo: obs.map(str::to_string),
            cod_quantum_fundomaster: None,
            st_cnpj_fundomaster: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fields_are_and_combined() {
        let filter = FundoFilter {
            classe: Some("renda fixa".to_string()),
            estrategia: Some("MACRO".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&fundo("Renda Fixa", "Macro", None), &[]));
        assert!(!filter.matches(&fundo("Renda Fixa", "Equity", None), &[]));
    }

    #[test]
    fn test_search_is_or_across_fields() {
        let filter = FundoFilter {
            search: Some("hedge".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&fundo("Renda Fixa", "Macro", Some("Hedge cambial")), &[]));
        assert!(filter.matches(&fundo("Hedge", "Macro", None), &[]));
        assert!(!filter.matches(&fundo("Renda Fixa", "Macro", None), &[]));
    }

    #[test]
    fn test_search_anded_with_other_filters() {
        let filter = FundoFilter {
            classe: Some("Ações".to_string()),
            search: Some("Macro".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&fundo("Renda Fixa", "Macro", None), &[]));
        assert!(filter.matches(&fundo("Ações", "Macro", None), &[]));
    }

    #[test]
    fn test_relatorio_matches_any_linked_name() {
        let filter = FundoFilter {
            relatorio: Some("int'l".to_string()),
            ..Default::default()
        };
        let nomes = vec!["Multimercados".to_string(), "MM Int'l".to_string()];
        assert!(filter.matches(&fundo("Renda Fixa", "Macro", None), &nomes));
        assert!(!filter.matches(&fundo("Renda Fixa", "Macro", None), &nomes[..1]));
    }

    #[test]
    fn test_normalized_drops_empty_terms() {
        let filter = FundoFilter {
            cnpj: Some(String::new()),
            search: Some("x".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(filter.cnpj, None);
        assert!(!filter.is_empty());
        assert!(FundoFilter::default().normalized().is_empty());
    }

    #[test]
    fn test_relatorio_filter_hides_inactive() {
        let mut relatorio = Relatorio {
            id: RelatorioId::new(1),
            nome: "RV Int'l USD".to_string(),
            descricao: None,
            ativo: true,
        };
        let filter = RelatorioFilter { nome: Some("usd".to_string()) };
        assert!(filter.matches(&relatorio));
        relatorio.ativo = false;
        assert!(!filter.matches(&relatorio));
    }

    proptest! {
        #[test]
        fn prop_any_substring_of_classe_matches(
            classe in "[A-Za-z ]{1,30}",
            start in 0usize..30,
            len in 0usize..30,
        ) {
            let end = (start + len).min(classe.len());
            let start = start.min(end);
            let filter = FundoFilter {
                classe: Some(classe[start..end].to_uppercase()),
                ..Default::default()
            };
            prop_assert!(filter.matches(&fundo(&classe, "Macro", None), &[]));
        }
    }
}
