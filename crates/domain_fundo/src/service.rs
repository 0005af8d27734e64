//! Fund registry services
//!
//! This module contains the write path shared by the HTTP API and the CSV
//! import. Model invariants live on [`NewFundo`]; the service adds the rules
//! that need storage: CNPJ uniqueness and the existence of every linked
//! report.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use core_kernel::{FundoId, HealthCheckResult, RelatorioId};

use crate::error::FundoError;
use crate::fundo::{FundoChanges, FundoDetail, FundoSummary, NewFundo};
use crate::ports::{FundoPort, RelatorioPort, UpsertOutcome};
use crate::query::{FundoFilter, RelatorioFilter};
use crate::relatorio::{NewRelatorio, Relatorio};
use crate::validation::{fields, messages, FieldErrors};

/// How an update treats required fields missing from the change set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Every required field must be supplied
    Full,
    /// Any subset of fields may be supplied
    Partial,
}

/// Service for reading and writing funds and their report links
///
/// Every write validates the complete resulting state and reports all
/// failing fields at once. Nothing reaches storage unless every check passes.
#[derive(Clone)]
pub struct FundoService {
    fundos: Arc<dyn FundoPort>,
    relatorios: Arc<dyn RelatorioPort>,
}

impl FundoService {
    /// Creates a new service over the given ports
    pub fn new(fundos: Arc<dyn FundoPort>, relatorios: Arc<dyn RelatorioPort>) -> Self {
        Self { fundos, relatorios }
    }

    /// Lists funds matching `filter`, newest first
    pub async fn list(&self, filter: FundoFilter) -> Result<Vec<FundoSummary>, FundoError> {
        let filter = filter.normalized();
        let fundos = self.fundos.find_fundos(&filter).await?;
        debug!(count = fundos.len(), "Listed fundos");
        Ok(fundos)
    }

    /// Retrieves a fund with its linked reports
    pub async fn get(&self, id: FundoId) -> Result<FundoDetail, FundoError> {
        Ok(self.fundos.get_fundo(id).await?)
    }

    /// Creates a fund and links it to `relatorios_ids`
    ///
    /// # Errors
    ///
    /// Returns `FundoError::Validation` naming every failing field when a
    /// required field is missing or blank, a CNPJ is malformed or fails its
    /// checksum, the CNPJ is already in use, the master invariant is broken,
    /// or a report id is unknown or inactive.
    pub async fn create(
        &self,
        changes: FundoChanges,
        relatorios_ids: Vec<RelatorioId>,
    ) -> Result<FundoDetail, FundoError> {
        let attrs = changes.apply_to(NewFundo::new("", "", ""));
        let ids = dedupe(relatorios_ids);

        self.check_write(&attrs, None, Some(&ids), FieldErrors::new()).await?;

        let created = self.fundos.create_fundo(attrs, &ids).await?;
        info!(
            id_fundo = %created.fundo.id_fundo,
            st_cnpj_fundo = %created.fundo.st_cnpj_fundo,
            relatorios = created.relatorios.len(),
            "Fundo created"
        );
        Ok(created)
    }

    /// Updates a fund
    ///
    /// The change set is merged over the stored fund and the merged state is
    /// validated as a whole. With `relatorios_ids` set the link set is
    /// replaced (an empty list clears it); with `None` links are untouched.
    pub async fn update(
        &self,
        id: FundoId,
        changes: FundoChanges,
        relatorios_ids: Option<Vec<RelatorioId>>,
        mode: UpdateMode,
    ) -> Result<FundoDetail, FundoError> {
        let current = self.fundos.get_fundo(id).await?;

        let mut errors = FieldErrors::new();
        if mode == UpdateMode::Full {
            if let Err(missing) = changes.require_complete() {
                errors.merge(missing);
            }
        }

        let attrs = changes.apply_to(current.fundo.attributes());
        let ids = relatorios_ids.map(dedupe);

        self.check_write(&attrs, Some(id), ids.as_deref(), errors).await?;

        let updated = self.fundos.update_fundo(id, attrs, ids.as_deref()).await?;
        info!(
            id_fundo = %id,
            links_replaced = ids.is_some(),
            "Fundo updated"
        );
        Ok(updated)
    }

    /// Inserts or updates the fund keyed by its CNPJ, replacing its links
    ///
    /// On update, master fields absent from `attrs` keep their stored
    /// values; every other attribute is overwritten.
    pub async fn upsert(
        &self,
        mut attrs: NewFundo,
        relatorios_ids: Vec<RelatorioId>,
    ) -> Result<UpsertOutcome, FundoError> {
        let ids = dedupe(relatorios_ids);

        if let Some(stored) = self.fundos.find_by_cnpj(&attrs.st_cnpj_fundo).await? {
            attrs.cod_quantum_fundomaster = attrs.cod_quantum_fundomaster.or(stored.cod_quantum_fundomaster);
            attrs.st_cnpj_fundomaster = attrs.st_cnpj_fundomaster.or(stored.st_cnpj_fundomaster);
        }

        let mut errors = FieldErrors::new();
        if let Err(invalid) = attrs.validate() {
            errors.merge(invalid);
        }
        self.check_relatorios(&ids, &mut errors).await?;
        errors.into_result()?;

        Ok(self.fundos.upsert_fundo(attrs, &ids).await?)
    }

    /// Deletes a fund and its links
    pub async fn delete(&self, id: FundoId) -> Result<(), FundoError> {
        self.fundos.delete_fundo(id).await?;
        info!(id_fundo = %id, "Fundo deleted");
        Ok(())
    }

    /// Reports linked to a fund, ordered by name
    pub async fn linked_relatorios(&self, id: FundoId) -> Result<Vec<Relatorio>, FundoError> {
        Ok(self.fundos.linked_relatorios(id).await?)
    }

    /// Distinct fund classes in use
    pub async fn classes(&self) -> Result<Vec<String>, FundoError> {
        Ok(self.fundos.distinct_classes().await?)
    }

    /// Distinct fund strategies in use
    pub async fn estrategias(&self) -> Result<Vec<String>, FundoError> {
        Ok(self.fundos.distinct_estrategias().await?)
    }

    /// Lists active reports matching `filter`
    pub async fn list_relatorios(&self, filter: RelatorioFilter) -> Result<Vec<Relatorio>, FundoError> {
        Ok(self.relatorios.find_active_relatorios(&filter.normalized()).await?)
    }

    /// Retrieves an active report
    pub async fn get_relatorio(&self, id: RelatorioId) -> Result<Relatorio, FundoError> {
        Ok(self.relatorios.get_active_relatorio(id).await?)
    }

    /// Looks a report up by exact name, active or not
    pub async fn relatorio_by_nome(&self, nome: &str) -> Result<Option<Relatorio>, FundoError> {
        Ok(self.relatorios.find_by_nome(nome).await?)
    }

    /// Creates a report unless one with the same name already exists
    pub async fn ensure_relatorio(&self, relatorio: NewRelatorio) -> Result<(Relatorio, bool), FundoError> {
        relatorio.validate()?;
        let (relatorio, created) = self.relatorios.get_or_create_relatorio(relatorio).await?;
        if created {
            info!(id = %relatorio.id, nome = %relatorio.nome, "Relatorio created");
        }
        Ok((relatorio, created))
    }

    /// Runs the health checks of both ports
    pub async fn health(&self) -> Vec<HealthCheckResult> {
        vec![
            self.fundos.health_check().await,
            self.relatorios.health_check().await,
        ]
    }

    async fn check_write(
        &self,
        attrs: &NewFundo,
        excluding: Option<FundoId>,
        relatorios_ids: Option<&[RelatorioId]>,
        mut errors: FieldErrors,
    ) -> Result<(), FundoError> {
        if let Err(invalid) = attrs.validate() {
            errors.merge(invalid);
        }

        if !errors.contains(fields::ST_CNPJ_FUNDO)
            && self.fundos.cnpj_taken(&attrs.st_cnpj_fundo, excluding).await?
        {
            errors.add(fields::ST_CNPJ_FUNDO, messages::CNPJ_TAKEN);
        }

        if let Some(ids) = relatorios_ids {
            self.check_relatorios(ids, &mut errors).await?;
        }

        Ok(errors.into_result()?)
    }

    /// Adds one error per id that is unknown or inactive
    async fn check_relatorios(
        &self,
        ids: &[RelatorioId],
        errors: &mut FieldErrors,
    ) -> Result<(), FundoError> {
        if ids.is_empty() {
            return Ok(());
        }

        let active = self.relatorios.active_relatorio_ids(ids).await?;
        for id in ids.iter().filter(|id| !active.contains(*id)) {
            errors.add(fields::RELATORIOS_IDS, relatorio_unavailable(*id));
        }
        Ok(())
    }
}

/// Message for a report id that cannot be linked
pub fn relatorio_unavailable(id: RelatorioId) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

/// Collapses repeated ids, keeping the first occurrence order
fn dedupe(ids: Vec<RelatorioId>) -> Vec<RelatorioId> {
    let mut seen = BTreeSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
