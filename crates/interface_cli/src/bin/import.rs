//! Fund Registry - CSV import command
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin fundos-import -- --csv-file dados.csv
//! DATABASE_URL=postgres://... cargo run --bin fundos-import -- --config config/import.toml
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use domain_fundo::FundoService;
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresFundoAdapter, PostgresRelatorioAdapter};
use interface_cli::{logger, CliConfig, ImportConfig, Importer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!(csv_file = %cli.csv_file.display(), "Starting fund import");

    let config = ImportConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    let pool = create_pool(DatabaseConfig::new(cli.database_url.as_str()))
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to apply database migrations")?;

    let service = FundoService::new(
        Arc::new(PostgresFundoAdapter::new(pool.clone())),
        Arc::new(PostgresRelatorioAdapter::new(pool)),
    );

    let report = Importer::new(service, config).run(&cli.csv_file).await?;

    println!("Import complete: {}", report);
    Ok(())
}
