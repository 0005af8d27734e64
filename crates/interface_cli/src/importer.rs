//! CSV import of funds
//!
//! Rows are applied one at a time in file order. Each row upserts its fund
//! by CNPJ and replaces that fund's report links. A failing row is logged
//! with its raw content and skipped; the rows after it still run.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use tracing::{debug, error, info, warn};

use core_kernel::RelatorioId;
use domain_fundo::{FundoService, NewRelatorio};

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::row::FundoRow;

/// Counts of what an import did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped_links: usize,
}

impl ImportReport {
    pub fn processed(&self) -> usize {
        self.created + self.updated + self.failed
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows: {} created, {} updated, {} failed, {} links skipped",
            self.processed(),
            self.created,
            self.updated,
            self.failed,
            self.skipped_links
        )
    }
}

enum RowOutcome {
    Created,
    Updated,
}

/// Loads fund rows into the registry
pub struct Importer {
    service: FundoService,
    relatorios: Vec<NewRelatorio>,
}

impl Importer {
    pub fn new(service: FundoService, config: ImportConfig) -> Self {
        Self {
            service,
            relatorios: config.relatorios,
        }
    }

    /// Ensures the configured reports exist, then imports the file at `path`
    pub async fn run(&self, path: &Path) -> Result<ImportReport> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.to_path_buf()));
        }

        self.ensure_relatorios().await?;

        let file = File::open(path)?;
        let report = self.import_reader(file).await?;
        info!(file = %path.display(), %report, "Import finished");
        Ok(report)
    }

    /// Creates every configured report that does not exist yet
    ///
    /// Existing reports are left untouched. Returns how many were created.
    pub async fn ensure_relatorios(&self) -> Result<usize> {
        let mut created = 0;
        for relatorio in &self.relatorios {
            let (_, was_created) = self.service.ensure_relatorio(relatorio.clone()).await?;
            if was_created {
                created += 1;
            }
        }
        debug!(created, configured = self.relatorios.len(), "Reports ensured");
        Ok(created)
    }

    /// Imports every row of a CSV stream
    ///
    /// Only an unreadable header or an IO failure aborts the import. Rows
    /// with the wrong number of columns or invalid UTF-8 fail on their own.
    pub async fn import_reader<R: Read>(&self, reader: R) -> Result<ImportReport> {
        let mut rows = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(reader);
        let headers = rows.headers()?.clone();

        let mut report = ImportReport::default();
        let mut bytes = ByteRecord::new();

        loop {
            match rows.read_byte_record(&mut bytes) {
                Ok(false) => break,
                Ok(true) => {}
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    report.failed += 1;
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    error!(line, error = %e, "Unreadable row");
                    continue;
                }
            }

            let line = bytes.position().map(|p| p.line()).unwrap_or_default();
            let outcome = match StringRecord::from_byte_record(bytes.clone()) {
                Ok(record) => self.import_record(&record, &headers, &mut report).await,
                Err(e) => Err(e.into()),
            };
            match outcome {
                Ok(RowOutcome::Created) => report.created += 1,
                Ok(RowOutcome::Updated) => report.updated += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(line, row = %raw(&bytes), error = %e, "Failed to import row");
                }
            }
        }

        Ok(report)
    }

    async fn import_record(
        &self,
        record: &StringRecord,
        headers: &StringRecord,
        report: &mut ImportReport,
    ) -> Result<RowOutcome> {
        if record.len() != headers.len() {
            return Err(ImportError::ColumnCount {
                expected: headers.len(),
                found: record.len(),
            });
        }
        let row: FundoRow = record.deserialize(Some(headers))?;
        let attrs = row.to_new_fundo()?;

        let mut ids: Vec<RelatorioId> = Vec::new();
        for nome in row.relatorio_nomes() {
            match self.service.relatorio_by_nome(nome).await? {
                Some(relatorio) if relatorio.ativo => ids.push(relatorio.id),
                Some(_) => {
                    report.skipped_links += 1;
                    warn!(relatorio = nome, st_cnpj_fundo = %attrs.st_cnpj_fundo, "Report inactive, link skipped");
                }
                None => {
                    report.skipped_links += 1;
                    warn!(relatorio = nome, st_cnpj_fundo = %attrs.st_cnpj_fundo, "Report not found, link skipped");
                }
            }
        }

        let outcome = self.service.upsert(attrs, ids).await?;
        let fundo = &outcome.fundo.fundo;
        if outcome.created {
            info!(id_fundo = %fundo.id_fundo, st_cnpj_fundo = %fundo.st_cnpj_fundo, "Fundo created");
            Ok(RowOutcome::Created)
        } else {
            info!(id_fundo = %fundo.id_fundo, st_cnpj_fundo = %fundo.st_cnpj_fundo, "Fundo updated");
            Ok(RowOutcome::Updated)
        }
    }
}

fn raw(record: &ByteRecord) -> String {
    record
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = ImportReport {
            created: 2,
            updated: 1,
            failed: 1,
            skipped_links: 3,
        };
        assert_eq!(
            report.to_string(),
            "4 rows: 2 created, 1 updated, 1 failed, 3 links skipped"
        );
    }

    #[test]
    fn test_raw_row_joins_fields() {
        let record = ByteRecord::from(vec!["a", "b c", ""]);
        assert_eq!(raw(&record), "a,b c,");
    }

    #[test]
    fn test_raw_row_keeps_invalid_utf8() {
        let mut record = ByteRecord::new();
        record.push_field(b"11.222.333/0001-81");
        record.push_field(b"Renda \xff");
        assert_eq!(raw(&record), "11.222.333/0001-81,Renda \u{FFFD}");
    }

    #[tokio::test]
    async fn test_short_and_long_rows_fail_alone() {
        use std::sync::Arc;
        use domain_fundo::MockFundoStore;

        let store = MockFundoStore::new();
        let service = FundoService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let importer = Importer::new(service, ImportConfig { relatorios: vec![] });
        let data = "ST_CNPJ_FUNDO,ST_CLASSE_FUNDO,ST_ESTRATEGIA_FUNDO,ST_OBS_FUNDO,COD_QUANTUM_FUNDOMASTER,ST_CNPJ_FUNDOMASTER,RELATORIOS\n\
            11.222.333/0001-81,Renda Fixa\n\
            11.222.333/0001-81,Renda Fixa,Macro,,,,,extra\n\
            11.222.333/0001-81,Renda Fixa,Macro,,,,\n";

        let report = importer.import_reader(data.as_bytes()).await.unwrap();

        assert_eq!(report.failed, 2);
        assert_eq!(report.created, 1);
    }
}
