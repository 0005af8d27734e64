//! PostgreSQL Fund Adapters
//!
//! This module provides the database adapters for the fund domain,
//! implementing `FundoPort` and `RelatorioPort` on top of the repositories.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::{PostgresFundoAdapter, PostgresRelatorioAdapter};
//! use domain_fundo::FundoService;
//! use std::sync::Arc;
//!
//! let service = FundoService::new(
//!     Arc::new(PostgresFundoAdapter::new(pool.clone())),
//!     Arc::new(PostgresRelatorioAdapter::new(pool)),
//! );
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, DomainPort, FundoId, HealthCheckResult, HealthCheckable, PortError, RelatorioId,
};
use domain_fundo::{
    Fundo, FundoDetail, FundoFilter, FundoPort, FundoSummary, NewFundo, NewRelatorio, Relatorio,
    RelatorioFilter, RelatorioPort, UpsertOutcome,
};

use crate::repositories::fundo::{FundoListRow, FundoRepository, FundoRow};
use crate::repositories::relatorio::{RelatorioRepository, RelatorioRow};

/// PostgreSQL-backed implementation of the FundoPort trait
///
/// Database errors are translated to `PortError` through
/// `From<DatabaseError>`; a duplicate CNPJ becomes a conflict on the
/// `st_cnpj_fundo` field.
#[derive(Debug, Clone)]
pub struct PostgresFundoAdapter {
    repository: FundoRepository,
    pool: PgPool,
}

impl PostgresFundoAdapter {
    /// Creates a new PostgreSQL fund adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: FundoRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresFundoAdapter {}

#[async_trait]
impl HealthCheckable for PostgresFundoAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-fundo-adapter").await
    }
}

#[async_trait]
impl FundoPort for PostgresFundoAdapter {
    #[instrument(skip(self), fields(id_fundo = %id))]
    async fn get_fundo(&self, id: FundoId) -> Result<FundoDetail, PortError> {
        debug!("Fetching fundo by ID");
        let (row, relatorios) = self.repository.get_with_relatorios(id.get()).await?;
        Ok(to_detail(row, relatorios))
    }

    #[instrument(skip(self))]
    async fn find_fundos(&self, filter: &FundoFilter) -> Result<Vec<FundoSummary>, PortError> {
        let rows = self.repository.find(filter).await?;
        debug!(count = rows.len(), "Found fundos");
        Ok(rows.into_iter().map(to_summary).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Fundo>, PortError> {
        Ok(self.repository.find_by_cnpj(cnpj).await?.map(to_fundo))
    }

    #[instrument(skip(self))]
    async fn cnpj_taken(&self, cnpj: &str, excluding: Option<FundoId>) -> Result<bool, PortError> {
        Ok(self
            .repository
            .cnpj_exists(cnpj, excluding.map(|id| id.get()))
            .await?)
    }

    #[instrument(skip(self, fundo), fields(st_cnpj_fundo = %fundo.st_cnpj_fundo))]
    async fn create_fundo(
        &self,
        fundo: NewFundo,
        relatorios: &[RelatorioId],
    ) -> Result<FundoDetail, PortError> {
        let (row, linked) = self.repository.insert(&fundo, &raw_ids(relatorios)).await?;
        debug!(id_fundo = row.id_fundo, "Inserted fundo");
        Ok(to_detail(row, linked))
    }

    #[instrument(skip(self, fundo), fields(id_fundo = %id))]
    async fn update_fundo(
        &self,
        id: FundoId,
        fundo: NewFundo,
        relatorios: Option<&[RelatorioId]>,
    ) -> Result<FundoDetail, PortError> {
        let ids = relatorios.map(raw_ids);
        let (row, linked) = self
            .repository
            .update(id.get(), &fundo, ids.as_deref())
            .await?;
        Ok(to_detail(row, linked))
    }

    #[instrument(skip(self, fundo), fields(st_cnpj_fundo = %fundo.st_cnpj_fundo))]
    async fn upsert_fundo(
        &self,
        fundo: NewFundo,
        relatorios: &[RelatorioId],
    ) -> Result<UpsertOutcome, PortError> {
        let (row, linked, created) = self.repository.upsert(&fundo, &raw_ids(relatorios)).await?;
        Ok(UpsertOutcome {
            fundo: to_detail(row, linked),
            created,
        })
    }

    #[instrument(skip(self), fields(id_fundo = %id))]
    async fn delete_fundo(&self, id: FundoId) -> Result<(), PortError> {
        Ok(self.repository.delete(id.get()).await?)
    }

    #[instrument(skip(self), fields(id_fundo = %id))]
    async fn linked_relatorios(&self, id: FundoId) -> Result<Vec<Relatorio>, PortError> {
        let (_, relatorios) = self.repository.get_with_relatorios(id.get()).await?;
        Ok(relatorios.into_iter().map(to_relatorio).collect())
    }

    async fn distinct_classes(&self) -> Result<Vec<String>, PortError> {
        Ok(self.repository.distinct_classes().await?)
    }

    async fn distinct_estrategias(&self) -> Result<Vec<String>, PortError> {
        Ok(self.repository.distinct_estrategias().await?)
    }
}

/// PostgreSQL-backed implementation of the RelatorioPort trait
#[derive(Debug, Clone)]
pub struct PostgresRelatorioAdapter {
    repository: RelatorioRepository,
    pool: PgPool,
}

impl PostgresRelatorioAdapter {
    /// Creates a new PostgreSQL report adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: RelatorioRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresRelatorioAdapter {}

#[async_trait]
impl HealthCheckable for PostgresRelatorioAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-relatorio-adapter").await
    }
}

#[async_trait]
impl RelatorioPort for PostgresRelatorioAdapter {
    #[instrument(skip(self), fields(relatorio_id = %id))]
    async fn get_active_relatorio(&self, id: RelatorioId) -> Result<Relatorio, PortError> {
        Ok(to_relatorio(self.repository.get_active(id.get()).await?))
    }

    #[instrument(skip(self))]
    async fn find_active_relatorios(
        &self,
        filter: &RelatorioFilter,
    ) -> Result<Vec<Relatorio>, PortError> {
        let rows = self.repository.find_active(filter.nome.as_deref()).await?;
        Ok(rows.into_iter().map(to_relatorio).collect())
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn active_relatorio_ids(
        &self,
        ids: &[RelatorioId],
    ) -> Result<BTreeSet<RelatorioId>, PortError> {
        let found = self.repository.active_ids(&raw_ids(ids)).await?;
        Ok(found.into_iter().map(RelatorioId::new).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_nome(&self, nome: &str) -> Result<Option<Relatorio>, PortError> {
        Ok(self.repository.find_by_nome(nome).await?.map(to_relatorio))
    }

    #[instrument(skip(self, relatorio), fields(nome = %relatorio.nome))]
    async fn get_or_create_relatorio(
        &self,
        relatorio: NewRelatorio,
    ) -> Result<(Relatorio, bool), PortError> {
        let (row, created) = self
            .repository
            .get_or_create(&relatorio.nome, relatorio.descricao.as_deref(), relatorio.ativo)
            .await?;
        Ok((to_relatorio(row), created))
    }

    #[instrument(skip(self), fields(relatorio_id = %id))]
    async fn set_ativo(&self, id: RelatorioId, ativo: bool) -> Result<Relatorio, PortError> {
        Ok(to_relatorio(self.repository.set_ativo(id.get(), ativo).await?))
    }
}

// =============================================================================
// Conversion Functions
// =============================================================================

/// Runs `SELECT 1` and reports the outcome
async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(_) => (AdapterHealth::Healthy, None),
        Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
    };

    HealthCheckResult {
        adapter_id: adapter_id.to_string(),
        status,
        latency_ms,
        message,
        checked_at: Utc::now(),
    }
}

fn raw_ids(ids: &[RelatorioId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

fn to_fundo(row: FundoRow) -> Fundo {
    Fundo {
        id_fundo: FundoId::new(row.id_fundo),
        st_cnpj_fundo: row.st_cnpj_fundo,
        st_classe_fundo: row.st_classe_fundo,
        st_estrategia_fundo: row.st_estrategia_fundo,
        st_obs_fundo: row.st_obs_fundo,
        cod_quantum_fundomaster: row.cod_quantum_fundomaster,
        st_cnpj_fundomaster: row.st_cnpj_fundomaster,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn to_relatorio(row: RelatorioRow) -> Relatorio {
    Relatorio {
        id: RelatorioId::new(row.id),
        nome: row.nome,
        descricao: row.descricao,
        ativo: row.ativo,
    }
}

fn to_detail(row: FundoRow, relatorios: Vec<RelatorioRow>) -> FundoDetail {
    FundoDetail {
        fundo: to_fundo(row),
        relatorios: relatorios.into_iter().map(to_relatorio).collect(),
    }
}

fn to_summary(row: FundoListRow) -> FundoSummary {
    FundoSummary {
        fundo: to_fundo(row.fundo),
        relatorios_nomes: row.relatorios_nomes,
    }
}
