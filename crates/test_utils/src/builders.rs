//! Test Data Builders
//!
//! Builder for fund payloads with sensible defaults. Tests set only the
//! fields they care about and render the result as a domain value or as the
//! JSON body the API accepts.

use serde_json::{json, Map, Value};

use core_kernel::RelatorioId;
use domain_fundo::{FundoChanges, NewFundo};

use crate::fixtures::CnpjFixtures;

/// Builder for constructing fund test data
#[derive(Debug, Clone)]
pub struct TestFundoBuilder {
    fundo: NewFundo,
    relatorios_ids: Option<Vec<RelatorioId>>,
}

impl Default for TestFundoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFundoBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            fundo: NewFundo::new(CnpjFixtures::primary(), "Renda Fixa", "Macro"),
            relatorios_ids: None,
        }
    }

    /// Sets the fund CNPJ
    pub fn with_cnpj(mut self, cnpj: impl Into<String>) -> Self {
        self.fundo.st_cnpj_fundo = cnpj.into();
        self
    }

    /// Sets the fund class
    pub fn with_classe(mut self, classe: impl Into<String>) -> Self {
        self.fundo.st_classe_fundo = classe.into();
        self
    }

    /// Sets the fund strategy
    pub fn with_estrategia(mut self, estrategia: impl Into<String>) -> Self {
        self.fundo.st_estrategia_fundo = estrategia.into();
        self
    }

    /// Sets the observation
    pub fn with_obs(mut self, obs: impl Into<String>) -> Self {
        self.fundo.st_obs_fundo = Some(obs.into());
        self
    }

    /// Sets the master fund code and CNPJ
    pub fn with_master(mut self, cod_quantum: Option<i32>, cnpj: Option<&str>) -> Self {
        self.fundo.cod_quantum_fundomaster = cod_quantum;
        self.fundo.st_cnpj_fundomaster = cnpj.map(str::to_string);
        self
    }

    /// Sets the report ids to link
    pub fn with_relatorios(mut self, ids: impl IntoIterator<Item = RelatorioId>) -> Self {
        self.relatorios_ids = Some(ids.into_iter().collect());
        self
    }

    /// Builds the fund attributes
    pub fn build(self) -> NewFundo {
        self.fundo
    }

    /// Builds a complete change set and the report ids
    pub fn build_changes(self) -> (FundoChanges, Vec<RelatorioId>) {
        (self.fundo.into(), self.relatorios_ids.unwrap_or_default())
    }

    /// Builds the JSON request body
    ///
    /// Optional fields that are unset are omitted; `relatorios_ids` is only
    /// present when [`TestFundoBuilder::with_relatorios`] was called.
    pub fn build_json(self) -> Value {
        let mut body = Map::new();
        body.insert("st_cnpj_fundo".into(), json!(self.fundo.st_cnpj_fundo));
        body.insert("st_classe_fundo".into(), json!(self.fundo.st_classe_fundo));
        body.insert("st_estrategia_fundo".into(), json!(self.fundo.st_estrategia_fundo));
        if let Some(obs) = self.fundo.st_obs_fundo {
            body.insert("st_obs_fundo".into(), json!(obs));
        }
        if let Some(cod) = self.fundo.cod_quantum_fundomaster {
            body.insert("cod_quantum_fundomaster".into(), json!(cod));
        }
        if let Some(master) = self.fundo.st_cnpj_fundomaster {
            body.insert("st_cnpj_fundomaster".into(), json!(master));
        }
        if let Some(ids) = self.relatorios_ids {
            body.insert("relatorios_ids".into(), json!(ids));
        }
        Value::Object(body)
    }
}
