//! Report repository implementation

use sqlx::PgPool;

use crate::error::DatabaseError;
use crate::repositories::like_pattern;

const RELATORIO_COLUMNS: &str = "id, nome, descricao, ativo";

/// Repository for the `relatorios` table
#[derive(Debug, Clone)]
pub struct RelatorioRepository {
    pool: PgPool,
}

impl RelatorioRepository {
    /// Creates a new RelatorioRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves an active report by id
    pub async fn get_active(&self, id: i64) -> Result<RelatorioRow, DatabaseError> {
        sqlx::query_as::<_, RelatorioRow>(&format!(
            "SELECT {RELATORIO_COLUMNS} FROM relatorios WHERE id = $1 AND ativo"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Relatorio", id))
    }

    /// Lists active reports whose name contains `nome`, ordered by name
    pub async fn find_active(&self, nome: Option<&str>) -> Result<Vec<RelatorioRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, RelatorioRow>(&format!(
            r#"
            SELECT {RELATORIO_COLUMNS}
            FROM relatorios
            WHERE ativo AND ($1::text IS NULL OR nome ILIKE $1)
            ORDER BY nome
            "#
        ))
        .bind(nome.map(like_pattern))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Returns the ids among `ids` that belong to active reports
    pub async fn active_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DatabaseError> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM relatorios WHERE ativo AND id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(found)
    }

    /// Looks a report up by exact name
    pub async fn find_by_nome(&self, nome: &str) -> Result<Option<RelatorioRow>, DatabaseError> {
        let row = sqlx::query_as::<_, RelatorioRow>(&format!(
            "SELECT {RELATORIO_COLUMNS} FROM relatorios WHERE nome = $1"
        ))
        .bind(nome)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Inserts the report unless the name is taken
    ///
    /// Returns the stored row and whether it was inserted by this call.
    pub async fn get_or_create(
        &self,
        nome: &str,
        descricao: Option<&str>,
        ativo: bool,
    ) -> Result<(RelatorioRow, bool), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, RelatorioRow>(&format!(
            r#"
            INSERT INTO relatorios (nome, descricao, ativo)
            VALUES ($1, $2, $3)
            ON CONFLICT (nome) DO NOTHING
            RETURNING {RELATORIO_COLUMNS}
            "#
        ))
        .bind(nome)
        .bind(descricao)
        .bind(ativo)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match inserted {
            Some(row) => (row, true),
            None => {
                let existing = sqlx::query_as::<_, RelatorioRow>(&format!(
                    "SELECT {RELATORIO_COLUMNS} FROM relatorios WHERE nome = $1"
                ))
                .bind(nome)
                .fetch_one(&mut *tx)
                .await?;
                (existing, false)
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    /// Sets the active flag of a report
    pub async fn set_ativo(&self, id: i64, ativo: bool) -> Result<RelatorioRow, DatabaseError> {
        sqlx::query_as::<_, RelatorioRow>(&format!(
            "UPDATE relatorios SET ativo = $2 WHERE id = $1 RETURNING {RELATORIO_COLUMNS}"
        ))
        .bind(id)
        .bind(ativo)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Relatorio", id))
    }
}

/// Database row for a report
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RelatorioRow {
    pub id: i64,
    pub nome: String,
    pub descricao: Option<String>,
    pub ativo: bool,
}
