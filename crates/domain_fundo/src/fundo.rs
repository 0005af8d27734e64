//! Fund definition and invariants
//!
//! This module defines the Fundo entity, the attribute set written to it, and
//! the change set applied by updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{is_formatted_cnpj, is_valid_cnpj, FundoId};

use crate::relatorio::Relatorio;
use crate::validation::{fields, messages, FieldErrors};

/// Maximum length of a masked CNPJ
pub const CNPJ_MAX_LENGTH: usize = 18;

/// Maximum length of the fund class
pub const CLASSE_MAX_LENGTH: usize = 100;

/// An investment fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fundo {
    /// System-assigned identifier
    pub id_fundo: FundoId,
    /// Fund CNPJ, unique across funds
    pub st_cnpj_fundo: String,
    /// ANBIMA class
    pub st_classe_fundo: String,
    /// Investment strategy
    pub st_estrategia_fundo: String,
    /// Free-form observations
    pub st_obs_fundo: Option<String>,
    /// Master fund code (soft reference)
    pub cod_quantum_fundomaster: Option<i32>,
    /// Master fund CNPJ (soft reference)
    pub st_cnpj_fundomaster: Option<String>,
    /// Set on insert
    pub created_at: DateTime<Utc>,
    /// Set on every update
    pub updated_at: DateTime<Utc>,
}

impl Fundo {
    /// Returns the writable attributes of this fund
    pub fn attributes(&self) -> NewFundo {
        NewFundo {
            st_cnpj_fundo: self.st_cnpj_fundo.clone(),
            st_classe_fundo: self.st_classe_fundo.clone(),
            st_estrategia_fundo: self.st_estrategia_fundo.clone(),
            st_obs_fundo: self.st_obs_fundo.clone(),
            cod_quantum_fundomaster: self.cod_quantum_fundomaster,
            st_cnpj_fundomaster: self.st_cnpj_fundomaster.clone(),
        }
    }

    /// Returns true when the fund points at a master fund
    pub fn has_master(&self) -> bool {
        self.cod_quantum_fundomaster.is_some() || self.st_cnpj_fundomaster.is_some()
    }
}

/// The writable attributes of a fund
///
/// Used both for inserts and as the fully merged state of an update; every
/// write validates it with [`NewFundo::validate`] before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFundo {
    pub st_cnpj_fundo: String,
    pub st_classe_fundo: String,
    pub st_estrategia_fundo: String,
    pub st_obs_fundo: Option<String>,
    pub cod_quantum_fundomaster: Option<i32>,
    pub st_cnpj_fundomaster: Option<String>,
}

impl NewFundo {
    /// Creates a fund with the required attributes only
    pub fn new(
        cnpj: impl Into<String>,
        classe: impl Into<String>,
        estrategia: impl Into<String>,
    ) -> Self {
        Self {
            st_cnpj_fundo: cnpj.into(),
            st_classe_fundo: classe.into(),
            st_estrategia_fundo: estrategia.into(),
            st_obs_fundo: None,
            cod_quantum_fundomaster: None,
            st_cnpj_fundomaster: None,
        }
    }

    /// Sets the observation
    pub fn with_obs(mut self, obs: impl Into<String>) -> Self {
        self.st_obs_fundo = Some(obs.into());
        self
    }

    /// Sets the master fund reference
    pub fn with_master(mut self, cod_quantum: Option<i32>, cnpj: Option<String>) -> Self {
        self.cod_quantum_fundomaster = cod_quantum;
        self.st_cnpj_fundomaster = cnpj;
        self
    }

    /// Checks every model invariant, collecting one entry per failing field
    ///
    /// - Fund CNPJ is present, follows the mask and passes the checksum
    /// - Class and strategy are non-blank; class fits its column
    /// - A master CNPJ, when present, follows the mask and passes the checksum
    /// - A master code requires a master CNPJ
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.st_cnpj_fundo.trim().is_empty() {
            errors.add(fields::ST_CNPJ_FUNDO, messages::REQUIRED);
        } else {
            check_cnpj(&mut errors, fields::ST_CNPJ_FUNDO, &self.st_cnpj_fundo, messages::CNPJ_INVALID);
        }

        if self.st_classe_fundo.trim().is_empty() {
            errors.add(fields::ST_CLASSE_FUNDO, messages::REQUIRED);
        } else if self.st_classe_fundo.chars().count() > CLASSE_MAX_LENGTH {
            errors.add(
                fields::ST_CLASSE_FUNDO,
                format!("Ensure this field has no more than {} characters.", CLASSE_MAX_LENGTH),
            );
        }

        if self.st_estrategia_fundo.trim().is_empty() {
            errors.add(fields::ST_ESTRATEGIA_FUNDO, messages::REQUIRED);
        }

        match &self.st_cnpj_fundomaster {
            Some(master) => {
                check_cnpj(&mut errors, fields::ST_CNPJ_FUNDOMASTER, master, messages::MASTER_CNPJ_INVALID);
            }
            None if self.cod_quantum_fundomaster.is_some() => {
                errors.add(fields::ST_CNPJ_FUNDOMASTER, messages::MASTER_CNPJ_REQUIRED);
            }
            None => {}
        }

        errors.into_result()
    }
}

fn check_cnpj(errors: &mut FieldErrors, field: &str, value: &str, invalid: &str) {
    if !is_formatted_cnpj(value) {
        errors.add(field, messages::CNPJ_FORMAT);
    } else if !is_valid_cnpj(value) {
        errors.add(field, invalid);
    }
}

/// A set of attribute changes for a fund
///
/// `None` leaves a field untouched. For optional fields the inner option
/// distinguishes clearing (`Some(None)`) from setting (`Some(Some(v))`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundoChanges {
    pub st_cnpj_fundo: Option<String>,
    pub st_classe_fundo: Option<String>,
    pub st_estrategia_fundo: Option<String>,
    pub st_obs_fundo: Option<Option<String>>,
    pub cod_quantum_fundomaster: Option<Option<i32>>,
    pub st_cnpj_fundomaster: Option<Option<String>>,
}

impl FundoChanges {
    /// Reports each required field that the change set does not supply
    pub fn require_complete(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.st_cnpj_fundo.is_none() {
            errors.add(fields::ST_CNPJ_FUNDO, messages::REQUIRED);
        }
        if self.st_classe_fundo.is_none() {
            errors.add(fields::ST_CLASSE_FUNDO, messages::REQUIRED);
        }
        if self.st_estrategia_fundo.is_none() {
            errors.add(fields::ST_ESTRATEGIA_FUNDO, messages::REQUIRED);
        }
        errors.into_result()
    }

    /// Builds the attributes of a new fund from a complete change set
    pub fn into_new(self) -> Result<NewFundo, FieldErrors> {
        self.require_complete()?;
        Ok(NewFundo {
            st_cnpj_fundo: self.st_cnpj_fundo.unwrap_or_default(),
            st_classe_fundo: self.st_classe_fundo.unwrap_or_default(),
            st_estrategia_fundo: self.st_estrategia_fundo.unwrap_or_default(),
            st_obs_fundo: self.st_obs_fundo.flatten(),
            cod_quantum_fundomaster: self.cod_quantum_fundomaster.flatten(),
            st_cnpj_fundomaster: self.st_cnpj_fundomaster.flatten(),
        })
    }

    /// Applies the changes on top of `base`
    pub fn apply_to(self, mut base: NewFundo) -> NewFundo {
        if let Some(cnpj) = self.st_cnpj_fundo {
            base.st_cnpj_fundo = cnpj;
        }
        if let Some(classe) = self.st_classe_fundo {
            base.st_classe_fundo = classe;
        }
        if let Some(estrategia) = self.st_estrategia_fundo {
            base.st_estrategia_fundo = estrategia;
        }
        if let Some(obs) = self.st_obs_fundo {
            base.st_obs_fundo = obs;
        }
        if let Some(cod) = self.cod_quantum_fundomaster {
            base.cod_quantum_fundomaster = cod;
        }
        if let Some(master) = self.st_cnpj_fundomaster {
            base.st_cnpj_fundomaster = master;
        }
        base
    }
}

impl From<NewFundo> for FundoChanges {
    fn from(fundo: NewFundo) -> Self {
        Self {
            st_cnpj_fundo: Some(fundo.st_cnpj_fundo),
            st_classe_fundo: Some(fundo.st_classe_fundo),
            st_estrategia_fundo: Some(fundo.st_estrategia_fundo),
            st_obs_fundo: Some(fundo.st_obs_fundo),
            cod_quantum_fundomaster: Some(fundo.cod_quantum_fundomaster),
            st_cnpj_fundomaster: Some(fundo.st_cnpj_fundomaster),
        }
    }
}

/// A fund together with its linked reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundoDetail {
    pub fundo: Fundo,
    /// Linked reports, ordered by name
    pub relatorios: Vec<Relatorio>,
}

/// A fund with only the names of its linked reports, for bulk listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundoSummary {
    pub fundo: Fundo,
    /// Linked report names, ordered by name
    pub relatorios_nomes: Vec<String>,
}
