//! Fund Domain Ports
//!
//! This module defines the storage interfaces of the fund domain. The
//! PostgreSQL adapters live in `infra_db`; an in-memory store is available
//! here behind the `mock` feature for tests.
//!
//! # Atomicity
//!
//! Writes that touch a fund and its report links ([`FundoPort::create_fundo`],
//! [`FundoPort::update_fundo`], [`FundoPort::upsert_fundo`]) must be applied
//! as one unit: either the new row and its complete link set are visible
//! together, or nothing changed.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_fundo::{FundoPort, RelatorioPort, FundoService};
//! use std::sync::Arc;
//!
//! let service = FundoService::new(
//!     Arc::new(PostgresFundoAdapter::new(pool.clone())),
//!     Arc::new(PostgresRelatorioAdapter::new(pool)),
//! );
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;

use core_kernel::{DomainPort, FundoId, HealthCheckable, PortError, RelatorioId};

use crate::fundo::{Fundo, FundoDetail, FundoSummary, NewFundo};
use crate::query::{FundoFilter, RelatorioFilter};
use crate::relatorio::{NewRelatorio, Relatorio};

/// Result of an insert-or-update keyed by CNPJ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub fundo: FundoDetail,
    /// True when a new row was inserted
    pub created: bool,
}

/// Port for fund storage
#[async_trait]
pub trait FundoPort: DomainPort + HealthCheckable {
    /// Retrieves a fund and its linked reports
    ///
    /// # Returns
    ///
    /// The fund if found, or `PortError::NotFound`
    async fn get_fundo(&self, id: FundoId) -> Result<FundoDetail, PortError>;

    /// Lists funds matching `filter`, newest first, each fund once
    async fn find_fundos(&self, filter: &FundoFilter) -> Result<Vec<FundoSummary>, PortError>;

    /// Looks a fund up by its exact CNPJ
    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Fundo>, PortError>;

    /// Returns true if a fund other than `excluding` already uses `cnpj`
    async fn cnpj_taken(&self, cnpj: &str, excluding: Option<FundoId>) -> Result<bool, PortError>;

    /// Inserts a fund and one link per report id
    async fn create_fundo(
        &self,
        fundo: NewFundo,
        relatorios: &[RelatorioId],
    ) -> Result<FundoDetail, PortError>;

    /// Overwrites a fund's attributes
    ///
    /// With `Some(ids)` the link set is replaced by `ids` (an empty slice
    /// clears it); with `None` existing links are left untouched.
    async fn update_fundo(
        &self,
        id: FundoId,
        fundo: NewFundo,
        relatorios: Option<&[RelatorioId]>,
    ) -> Result<FundoDetail, PortError>;

    /// Inserts or updates the fund with the same CNPJ and replaces its links
    async fn upsert_fundo(
        &self,
        fundo: NewFundo,
        relatorios: &[RelatorioId],
    ) -> Result<UpsertOutcome, PortError>;

    /// Deletes a fund together with its links
    async fn delete_fundo(&self, id: FundoId) -> Result<(), PortError>;

    /// Reports linked to a fund, ordered by name
    async fn linked_relatorios(&self, id: FundoId) -> Result<Vec<Relatorio>, PortError>;

    /// Distinct class values in use, sorted
    async fn distinct_classes(&self) -> Result<Vec<String>, PortError>;

    /// Distinct strategy values in use, sorted
    async fn distinct_estrategias(&self) -> Result<Vec<String>, PortError>;
}

/// Port for report storage
#[async_trait]
pub trait RelatorioPort: DomainPort + HealthCheckable {
    /// Retrieves an active report; inactive ones are reported as not found
    async fn get_active_relatorio(&self, id: RelatorioId) -> Result<Relatorio, PortError>;

    /// Lists active reports matching `filter`, ordered by name
    async fn find_active_relatorios(
        &self,
        filter: &RelatorioFilter,
    ) -> Result<Vec<Relatorio>, PortError>;

    /// Returns the subset of `ids` that reference existing active reports
    async fn active_relatorio_ids(
        &self,
        ids: &[RelatorioId],
    ) -> Result<BTreeSet<RelatorioId>, PortError>;

    /// Looks a report up by its exact name, active or not
    async fn find_by_nome(&self, nome: &str) -> Result<Option<Relatorio>, PortError>;

    /// Creates the report unless one with the same name exists
    ///
    /// An existing report is returned unchanged. The flag is true when a
    /// new report was created.
    async fn get_or_create_relatorio(
        &self,
        relatorio: NewRelatorio,
    ) -> Result<(Relatorio, bool), PortError>;

    /// Activates or deactivates a report
    async fn set_ativo(&self, id: RelatorioId, ativo: bool) -> Result<Relatorio, PortError>;
}

/// Mock implementation for testing
///
/// One store implements both ports so links can resolve report names.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use chrono::Utc;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    use crate::validation::{fields, messages};

    #[derive(Debug, Default)]
    struct MockState {
        fundos: BTreeMap<FundoId, Fundo>,
        relatorios: BTreeMap<RelatorioId, Relatorio>,
        links: BTreeSet<(FundoId, RelatorioId)>,
        next_fundo_id: i64,
        next_relatorio_id: i64,
    }

    impl MockState {
        fn cnpj_taken(&self, cnpj: &str, excluding: Option<FundoId>) -> bool {
            self.fundos
                .values()
                .any(|f| f.st_cnpj_fundo == cnpj && Some(f.id_fundo) != excluding)
        }

        fn linked(&self, id: FundoId) -> Vec<Relatorio> {
            let mut relatorios: Vec<Relatorio> = self
                .links
                .iter()
                .filter(|(fundo, _)| *fundo == id)
                .filter_map(|(_, relatorio)| self.relatorios.get(relatorio).cloned())
                .collect();
            relatorios.sort_by(|a, b| a.nome.cmp(&b.nome));
            relatorios
        }

        fn detail(&self, id: FundoId) -> Result<FundoDetail, PortError> {
            let fundo = self
                .fundos
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Fundo", id))?;
            Ok(FundoDetail {
                relatorios: self.linked(id),
                fundo,
            })
        }

        fn check_links(&self, relatorios: &[RelatorioId]) -> Result<(), PortError> {
            match relatorios.iter().find(|id| !self.relatorios.contains_key(*id)) {
                Some(missing) => Err(PortError::validation_field(
                    format!("Relatorio {} does not exist", missing),
                    fields::RELATORIOS_IDS,
                )),
                None => Ok(()),
            }
        }

        fn replace_links(&mut self, id: FundoId, relatorios: &[RelatorioId]) {
            self.links.retain(|(fundo, _)| *fundo != id);
            for relatorio in relatorios {
                self.links.insert((id, *relatorio));
            }
        }

        fn insert(&mut self, attrs: NewFundo) -> FundoId {
            self.next_fundo_id += 1;
            let id = FundoId::new(self.next_fundo_id);
            let now = Utc::now();
            self.fundos.insert(id, build_fundo(id, attrs, now, now));
            id
        }

        fn overwrite(&mut self, id: FundoId, attrs: NewFundo) -> Result<(), PortError> {
            let current = self
                .fundos
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Fundo", id))?;
            *current = build_fundo(id, attrs, current.created_at, Utc::now());
            Ok(())
        }
    }

    fn build_fundo(
        id: FundoId,
        attrs: NewFundo,
        created_at: chrono::DateTime<Utc>,
        updated_at: chrono::DateTime<Utc>,
    ) -> Fundo {
        Fundo {
            id_fundo: id,
            st_cnpj_fundo: attrs.st_cnpj_fundo,
            st_classe_fundo: attrs.st_classe_fundo,
            st_estrategia_fundo: attrs.st_estrategia_fundo,
            st_obs_fundo: attrs.st_obs_fundo,
            cod_quantum_fundomaster: attrs.cod_quantum_fundomaster,
            st_cnpj_fundomaster: attrs.st_cnpj_fundomaster,
            created_at,
            updated_at,
        }
    }

    fn duplicate_cnpj() -> PortError {
        PortError::conflict_field(messages::CNPJ_TAKEN, fields::ST_CNPJ_FUNDO)
    }

    /// In-memory implementation of both fund ports
    ///
    /// Cloning shares the underlying state.
    #[derive(Debug, Clone, Default)]
    pub struct MockFundoStore {
        state: Arc<RwLock<MockState>>,
    }

    impl MockFundoStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds a report directly, bypassing the get-or-create lookup
        pub async fn seed_relatorio(&self, nome: &str, ativo: bool) -> Relatorio {
            let mut state = self.state.write().await;
            state.next_relatorio_id += 1;
            let relatorio = Relatorio {
                id: RelatorioId::new(state.next_relatorio_id),
                nome: nome.to_string(),
                descricao: None,
                ativo,
            };
            state.relatorios.insert(relatorio.id, relatorio.clone());
            relatorio
        }

        /// Number of stored funds
        pub async fn fundo_count(&self) -> usize {
            self.state.read().await.fundos.len()
        }

        /// Number of stored fund-report links
        pub async fn link_count(&self) -> usize {
            self.state.read().await.links.len()
        }
    }

    impl DomainPort for MockFundoStore {}

    #[async_trait]
    impl HealthCheckable for MockFundoStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-fundo-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl FundoPort for MockFundoStore {
        async fn get_fundo(&self, id: FundoId) -> Result<FundoDetail, PortError> {
            self.state.read().await.detail(id)
        }

        async fn find_fundos(&self, filter: &FundoFilter) -> Result<Vec<FundoSummary>, PortError> {
            let state = self.state.read().await;
            let mut results: Vec<FundoSummary> = state
                .fundos
                .values()
                .filter_map(|fundo| {
                    let nomes: Vec<String> = state
                        .linked(fundo.id_fundo)
                        .into_iter()
                        .map(|r| r.nome)
                        .collect();
                    filter.matches(fundo, &nomes).then(|| FundoSummary {
                        fundo: fundo.clone(),
                        relatorios_nomes: nomes,
                    })
                })
                .collect();

            results.sort_by(|a, b| {
                b.fundo
                    .created_at
                    .cmp(&a.fundo.created_at)
                    .then(b.fundo.id_fundo.cmp(&a.fundo.id_fundo))
            });
            Ok(results)
        }

        async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Fundo>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .fundos
                .values()
                .find(|f| f.st_cnpj_fundo == cnpj)
                .cloned())
        }

        async fn cnpj_taken(&self, cnpj: &str, excluding: Option<FundoId>) -> Result<bool, PortError> {
            Ok(self.state.read().await.cnpj_taken(cnpj, excluding))
        }

        async fn create_fundo(
            &self,
            fundo: NewFundo,
            relatorios: &[RelatorioId],
        ) -> Result<FundoDetail, PortError> {
            let mut state = self.state.write().await;
            if state.cnpj_taken(&fundo.st_cnpj_fundo, None) {
                return Err(duplicate_cnpj());
            }
            state.check_links(relatorios)?;

            let id = state.insert(fundo);
            state.replace_links(id, relatorios);
            state.detail(id)
        }

        async fn update_fundo(
            &self,
            id: FundoId,
            fundo: NewFundo,
            relatorios: Option<&[RelatorioId]>,
        ) -> Result<FundoDetail, PortError> {
            let mut state = self.state.write().await;
            if !state.fundos.contains_key(&id) {
                return Err(PortError::not_found("Fundo", id));
            }
            if state.cnpj_taken(&fundo.st_cnpj_fundo, Some(id)) {
                return Err(duplicate_cnpj());
            }
            if let Some(relatorios) = relatorios {
                state.check_links(relatorios)?;
            }

            state.overwrite(id, fundo)?;
            if let Some(relatorios) = relatorios {
                state.replace_links(id, relatorios);
            }
            state.detail(id)
        }

        async fn upsert_fundo(
            &self,
            fundo: NewFundo,
            relatorios: &[RelatorioId],
        ) -> Result<UpsertOutcome, PortError> {
            let mut state = self.state.write().await;
            state.check_links(relatorios)?;

            let existing = state
                .fundos
                .values()
                .find(|f| f.st_cnpj_fundo == fundo.st_cnpj_fundo)
                .map(|f| f.id_fundo);

            let (id, created) = match existing {
                Some(id) => {
                    state.overwrite(id, fundo)?;
                    (id, false)
                }
                None => (state.insert(fundo), true),
            };
            state.replace_links(id, relatorios);

            Ok(UpsertOutcome {
                fundo: state.detail(id)?,
                created,
            })
        }

        async fn delete_fundo(&self, id: FundoId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            state
                .fundos
                .remove(&id)
                .ok_or_else(|| PortError::not_found("Fundo", id))?;
            state.links.retain(|(fundo, _)| *fundo != id);
            Ok(())
        }

        async fn linked_relatorios(&self, id: FundoId) -> Result<Vec<Relatorio>, PortError> {
            let state = self.state.read().await;
            if !state.fundos.contains_key(&id) {
                return Err(PortError::not_found("Fundo", id));
            }
            Ok(state.linked(id))
        }

        async fn distinct_classes(&self) -> Result<Vec<String>, PortError> {
            let state = self.state.read().await;
            let classes: BTreeSet<String> =
                state.fundos.values().map(|f| f.st_classe_fundo.clone()).collect();
            Ok(classes.into_iter().collect())
        }

        async fn distinct_estrategias(&self) -> Result<Vec<String>, PortError> {
            let state = self.state.read().await;
            let estrategias: BTreeSet<String> =
                state.fundos.values().map(|f| f.st_estrategia_fundo.clone()).collect();
            Ok(estrategias.into_iter().collect())
        }
    }

    #[async_trait]
    impl RelatorioPort for MockFundoStore {
        async fn get_active_relatorio(&self, id: RelatorioId) -> Result<Relatorio, PortError> {
            self.state
                .read()
                .await
                .relatorios
                .get(&id)
                .filter(|r| r.ativo)
                .cloned()
                .ok_or_else(|| PortError::not_found("Relatorio", id))
        }

        async fn find_active_relatorios(
            &self,
            filter: &RelatorioFilter,
        ) -> Result<Vec<Relatorio>, PortError> {
            let state = self.state.read().await;
            let mut relatorios: Vec<Relatorio> = state
                .relatorios
                .values()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect();
            relatorios.sort_by(|a, b| a.nome.cmp(&b.nome));
            Ok(relatorios)
        }

        async fn active_relatorio_ids(
            &self,
            ids: &[RelatorioId],
        ) -> Result<BTreeSet<RelatorioId>, PortError> {
            let state = self.state.read().await;
            Ok(ids
                .iter()
                .filter(|id| state.relatorios.get(*id).is_some_and(|r| r.ativo))
                .copied()
                .collect())
        }

        async fn find_by_nome(&self, nome: &str) -> Result<Option<Relatorio>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .relatorios
                .values()
                .find(|r| r.nome == nome)
                .cloned())
        }

        async fn get_or_create_relatorio(
            &self,
            relatorio: NewRelatorio,
        ) -> Result<(Relatorio, bool), PortError> {
            let mut state = self.state.write().await;
            if let Some(existing) = state.relatorios.values().find(|r| r.nome == relatorio.nome) {
                return Ok((existing.clone(), false));
            }

            state.next_relatorio_id += 1;
            let created = Relatorio {
                id: RelatorioId::new(state.next_relatorio_id),
                nome: relatorio.nome,
                descricao: relatorio.descricao,
                ativo: relatorio.ativo,
            };
            state.relatorios.insert(created.id, created.clone());
            Ok((created, true))
        }

        async fn set_ativo(&self, id: RelatorioId, ativo: bool) -> Result<Relatorio, PortError> {
            let mut state = self.state.write().await;
            let relatorio = state
                .relatorios
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Relatorio", id))?;
            relatorio.ativo = ativo;
            Ok(relatorio.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::MockFundoStore;

    fn fundo(cnpj: &str) -> NewFundo {
        NewFundo::new(cnpj, "Renda Fixa", "Macro")
    }

    #[tokio::test]
    async fn test_mock_create_and_get() {
        let store = MockFundoStore::new();
        let relatorio = store.seed_relatorio("Multimercados", true).await;

        let created = store
            .create_fundo(fundo("11.222.333/0001-81"), &[relatorio.id])
            .await
            .unwrap();
        let fetched = store.get_fundo(created.fundo.id_fundo).await.unwrap();

        assert_eq!(fetched.fundo.st_cnpj_fundo, "11.222.333/0001-81");
        assert_eq!(fetched.relatorios, vec![relatorio]);
    }

    #[tokio::test]
    async fn test_mock_rejects_duplicate_cnpj() {
        let store = MockFundoStore::new();
        store.create_fundo(fundo("11.222.333/0001-81"), &[]).await.unwrap();
        let err = store.create_fundo(fundo("11.222.333/0001-81"), &[]).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_mock_update_without_links_keeps_them() {
        let store = MockFundoStore::new();
        let r1 = store.seed_relatorio("A", true).await;
        let created = store.create_fundo(fundo("11.222.333/0001-81"), &[r1.id]).await.unwrap();

        let mut attrs = created.fundo.attributes();
        attrs.st_classe_fundo = "Ações".to_string();
        let updated = store
            .update_fundo(created.fundo.id_fundo, attrs, None)
            .await
            .unwrap();

        assert_eq!(updated.fundo.st_classe_fundo, "Ações");
        assert_eq!(updated.relatorios.len(), 1);
        assert_eq!(updated.fundo.created_at, created.fundo.created_at);
    }

    #[tokio::test]
    async fn test_mock_delete_cascades_links() {
        let store = MockFundoStore::new();
        let r1 = store.seed_relatorio("A", true).await;
        let created = store.create_fundo(fundo("11.222.333/0001-81"), &[r1.id]).await.unwrap();
        assert_eq!(store.link_count().await, 1);

        store.delete_fundo(created.fundo.id_fundo).await.unwrap();
        assert_eq!(store.link_count().await, 0);
        assert!(store.get_fundo(created.fundo.id_fundo).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mock_upsert_reports_created_then_updated() {
        let store = MockFundoStore::new();
        let first = store.upsert_fundo(fundo("11.222.333/0001-81"), &[]).await.unwrap();
        let second = store.upsert_fundo(fundo("11.222.333/0001-81"), &[]).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.fundo.fundo.id_fundo, second.fundo.fundo.id_fundo);
        assert_eq!(store.fundo_count().await, 1);
    }

    #[tokio::test]
    async fn test_mock_get_or_create_keeps_existing() {
        let store = MockFundoStore::new();
        let (first, created) = store
            .get_or_create_relatorio(NewRelatorio::new("MM Int'l").with_descricao("original"))
            .await
            .unwrap();
        assert!(created);

        let (second, created) = store
            .get_or_create_relatorio(NewRelatorio::new("MM Int'l").with_descricao("changed"))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(second, first);
        assert_eq!(second.descricao.as_deref(), Some("original"));
    }

    #[tokio::test]
    async fn test_mock_inactive_report_hidden() {
        let store = MockFundoStore::new();
        let relatorio = store.seed_relatorio("Antigo", true).await;
        store.set_ativo(relatorio.id, false).await.unwrap();

        assert!(store.get_active_relatorio(relatorio.id).await.unwrap_err().is_not_found());
        assert!(store.active_relatorio_ids(&[relatorio.id]).await.unwrap().is_empty());
        assert!(store
            .find_active_relatorios(&RelatorioFilter::default())
            .await
            .unwrap()
            .is_empty());
    }
}
