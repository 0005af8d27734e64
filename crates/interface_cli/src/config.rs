//! Import configuration
//!
//! The reports that must exist before any row is linked are listed in a
//! TOML file:
//!
//! ```toml
//! [[relatorios]]
//! nome = "Multimercados"
//! descricao = "Relatório de Multimercados"
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use core_kernel::CoreError;
use domain_fundo::NewRelatorio;

use crate::error::Result;

pub const DEFAULT_CSV_FILE: &str = "/app/dados-ps-estagio-20250703.csv";
pub const DEFAULT_CONFIG_FILE: &str = "config/import.toml";

/// Command line of `fundos-import`
#[derive(Debug, Clone, Parser)]
#[command(name = "fundos-import", about = "Loads funds and their report links from a CSV file")]
pub struct CliConfig {
    /// CSV file with the funds to load
    #[arg(long, default_value = DEFAULT_CSV_FILE)]
    pub csv_file: PathBuf,

    /// TOML file listing the reports to create before loading
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://localhost/fundos")]
    pub database_url: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Contents of the import configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub relatorios: Vec<NewRelatorio>,
}

impl ImportConfig {
    /// Loads and checks the configuration file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects blank or repeated report names
    pub fn validate(&self) -> std::result::Result<(), CoreError> {
        let mut seen = BTreeSet::new();
        for relatorio in &self.relatorios {
            if relatorio.validate().is_err() {
                return Err(CoreError::configuration(format!(
                    "invalid report name {:?}",
                    relatorio.nome
                )));
            }
            if !seen.insert(relatorio.nome.as_str()) {
                return Err(CoreError::configuration(format!(
                    "report {:?} listed twice",
                    relatorio.nome
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = CliConfig::try_parse_from(["fundos-import", "--database-url", "postgres://db/x"]).unwrap();
        assert_eq!(cli.csv_file, PathBuf::from(DEFAULT_CSV_FILE));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parses_report_list() {
        let config = ImportConfig::from_toml(
            r#"
            [[relatorios]]
            nome = "MM Int'l"
            descricao = "Relatório de Multimercados Internacional"

            [[relatorios]]
            nome = "Multimercados"
            "#,
        )
        .unwrap();

        assert_eq!(config.relatorios.len(), 2);
        assert!(config.relatorios[1].ativo);
        assert_eq!(config.relatorios[1].descricao, None);
    }

    #[test]
    fn test_rejects_repeated_names() {
        let err = ImportConfig::from_toml(
            r#"
            [[relatorios]]
            nome = "Multimercados"
            [[relatorios]]
            nome = "Multimercados"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/import.toml");
        let config = ImportConfig::load(path).unwrap();
        let nomes: Vec<_> = config.relatorios.iter().map(|r| r.nome.as_str()).collect();
        assert_eq!(nomes, vec!["RV Int'l USD", "MM Int'l", "Multimercados"]);
    }
}
