//! Fund repository implementation
//!
//! This module provides database access for funds and their report links.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use domain_fundo::{FundoFilter, NewFundo};

use crate::error::DatabaseError;
use crate::repositories::like_pattern;
use crate::repositories::relatorio::RelatorioRow;

const FUNDO_COLUMNS: &str = "id_fundo, st_cnpj_fundo, st_classe_fundo, st_estrategia_fundo, \
     st_obs_fundo, cod_quantum_fundomaster, st_cnpj_fundomaster, created_at, updated_at";

/// Repository for the `fundos` and `fundo_relatorios` tables
#[derive(Debug, Clone)]
pub struct FundoRepository {
    pool: PgPool,
}

impl FundoRepository {
    /// Creates a new FundoRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a fund together with its linked reports
    pub async fn get_with_relatorios(
        &self,
        id: i64,
    ) -> Result<(FundoRow, Vec<RelatorioRow>), DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let fundo = fetch_fundo(&mut conn, id).await?;
        let relatorios = fetch_relatorios(&mut conn, id).await?;
        Ok((fundo, relatorios))
    }

    /// Lists funds matching `filter`, newest first
    ///
    /// Every term is a case-insensitive substring match. The report filter
    /// is an `EXISTS` subquery so a fund linked to several matching reports
    /// is returned once.
    pub async fn find(&self, filter: &FundoFilter) -> Result<Vec<FundoListRow>, DatabaseError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"
            SELECT {FUNDO_COLUMNS},
                ARRAY(
                    SELECT r.nome::text
                    FROM fundo_relatorios fr
                    JOIN relatorios r ON r.id = fr.relatorio_id
                    WHERE fr.fundo_id = fundos.id_fundo
                    ORDER BY r.nome
                ) AS relatorios_nomes
            FROM fundos
            WHERE TRUE
            "#
        ));

        for (column, term) in [
            ("st_cnpj_fundo", &filter.cnpj),
            ("st_classe_fundo", &filter.classe),
            ("st_estrategia_fundo", &filter.estrategia),
        ] {
            if let Some(term) = term {
                query
                    .push(format_args!(" AND {column} ILIKE "))
                    .push_bind(like_pattern(term));
            }
        }

        if let Some(term) = &filter.relatorio {
            query
                .push(
                    " AND EXISTS (SELECT 1 FROM fundo_relatorios fr \
                     JOIN relatorios r ON r.id = fr.relatorio_id \
                     WHERE fr.fundo_id = fundos.id_fundo AND r.nome ILIKE ",
                )
                .push_bind(like_pattern(term))
                .push(")");
        }

        if let Some(term) = &filter.search {
            let pattern = like_pattern(term);
            query.push(" AND (st_cnpj_fundo ILIKE ").push_bind(pattern.clone());
            query.push(" OR st_classe_fundo ILIKE ").push_bind(pattern.clone());
            query.push(" OR st_estrategia_fundo ILIKE ").push_bind(pattern.clone());
            query.push(" OR st_obs_fundo ILIKE ").push_bind(pattern);
            query.push(")");
        }

        query.push(" ORDER BY created_at DESC, id_fundo DESC");

        let rows = query
            .build_query_as::<FundoListRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Looks a fund up by exact CNPJ
    pub async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<FundoRow>, DatabaseError> {
        let row = sqlx::query_as::<_, FundoRow>(&format!(
            "SELECT {FUNDO_COLUMNS} FROM fundos WHERE st_cnpj_fundo = $1"
        ))
        .bind(cnpj)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Returns true if a fund other than `excluding` uses `cnpj`
    pub async fn cnpj_exists(&self, cnpj: &str, excluding: Option<i64>) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM fundos
                WHERE st_cnpj_fundo = $1 AND ($2::bigint IS NULL OR id_fundo <> $2)
            )
            "#,
        )
        .bind(cnpj)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Inserts a fund and its links in one transaction
    pub async fn insert(
        &self,
        fundo: &NewFundo,
        relatorios: &[i64],
    ) -> Result<(FundoRow, Vec<RelatorioRow>), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, FundoRow>(&format!(
            r#"
            INSERT INTO fundos (
                st_cnpj_fundo, st_classe_fundo, st_estrategia_fundo,
                st_obs_fundo, cod_quantum_fundomaster, st_cnpj_fundomaster
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FUNDO_COLUMNS}
            "#
        ))
        .bind(&fundo.st_cnpj_fundo)
        .bind(&fundo.st_classe_fundo)
        .bind(&fundo.st_estrategia_fundo)
        .bind(&fundo.st_obs_fundo)
        .bind(fundo.cod_quantum_fundomaster)
        .bind(&fundo.st_cnpj_fundomaster)
        .fetch_one(&mut *tx)
        .await?;

        insert_links(&mut tx, row.id_fundo, relatorios).await?;
        let linked = fetch_relatorios(&mut tx, row.id_fundo).await?;

        tx.commit().await?;
        Ok((row, linked))
    }

    /// Overwrites a fund's attributes and, when given, replaces its links
    pub async fn update(
        &self,
        id: i64,
        fundo: &NewFundo,
        relatorios: Option<&[i64]>,
    ) -> Result<(FundoRow, Vec<RelatorioRow>), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, FundoRow>(&format!(
            r#"
            UPDATE fundos SET
                st_cnpj_fundo = $2,
                st_classe_fundo = $3,
                st_estrategia_fundo = $4,
                st_obs_fundo = $5,
                cod_quantum_fundomaster = $6,
                st_cnpj_fundomaster = $7,
                updated_at = NOW()
            WHERE id_fundo = $1
            RETURNING {FUNDO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fundo.st_cnpj_fundo)
        .bind(&fundo.st_classe_fundo)
        .bind(&fundo.st_estrategia_fundo)
        .bind(&fundo.st_obs_fundo)
        .bind(fundo.cod_quantum_fundomaster)
        .bind(&fundo.st_cnpj_fundomaster)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Fundo", id))?;

        if let Some(relatorios) = relatorios {
            replace_links(&mut tx, id, relatorios).await?;
        }
        let linked = fetch_relatorios(&mut tx, id).await?;

        tx.commit().await?;
        Ok((row, linked))
    }

    /// Inserts or updates the fund with the same CNPJ and replaces its links
    ///
    /// Returns the stored row, its links and whether the row was inserted.
    pub async fn upsert(
        &self,
        fundo: &NewFundo,
        relatorios: &[i64],
    ) -> Result<(FundoRow, Vec<RelatorioRow>, bool), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let upserted = sqlx::query_as::<_, UpsertRow>(&format!(
            r#"
            INSERT INTO fundos (
                st_cnpj_fundo, st_classe_fundo, st_estrategia_fundo,
                st_obs_fundo, cod_quantum_fundomaster, st_cnpj_fundomaster
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (st_cnpj_fundo) DO UPDATE SET
                st_classe_fundo = EXCLUDED.st_classe_fundo,
                st_estrategia_fundo = EXCLUDED.st_estrategia_fundo,
                st_obs_fundo = EXCLUDED.st_obs_fundo,
                cod_quantum_fundomaster = EXCLUDED.cod_quantum_fundomaster,
                st_cnpj_fundomaster = EXCLUDED.st_cnpj_fundomaster,
                updated_at = NOW()
            RETURNING {FUNDO_COLUMNS}, (xmax = 0) AS inserted
            "#
        ))
        .bind(&fundo.st_cnpj_fundo)
        .bind(&fundo.st_classe_fundo)
        .bind(&fundo.st_estrategia_fundo)
        .bind(&fundo.st_obs_fundo)
        .bind(fundo.cod_quantum_fundomaster)
        .bind(&fundo.st_cnpj_fundomaster)
        .fetch_one(&mut *tx)
        .await?;

        let id = upserted.fundo.id_fundo;
        replace_links(&mut tx, id, relatorios).await?;
        let linked = fetch_relatorios(&mut tx, id).await?;

        tx.commit().await?;
        Ok((upserted.fundo, linked, upserted.inserted))
    }

    /// Deletes a fund; links go with it through `ON DELETE CASCADE`
    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM fundos WHERE id_fundo = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Fundo", id));
        }
        Ok(())
    }

    /// Distinct values of a text column, sorted
    async fn distinct(&self, column: &str) -> Result<Vec<String>, DatabaseError> {
        let values = sqlx::query_scalar::<_, String>(&format!(
            "SELECT DISTINCT {column}::text FROM fundos ORDER BY 1"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    /// Distinct fund classes in use
    pub async fn distinct_classes(&self) -> Result<Vec<String>, DatabaseError> {
        self.distinct("st_classe_fundo").await
    }

    /// Distinct fund strategies in use
    pub async fn distinct_estrategias(&self) -> Result<Vec<String>, DatabaseError> {
        self.distinct("st_estrategia_fundo").await
    }
}

async fn fetch_fundo(conn: &mut PgConnection, id: i64) -> Result<FundoRow, DatabaseError> {
    sqlx::query_as::<_, FundoRow>(&format!(
        "SELECT {FUNDO_COLUMNS} FROM fundos WHERE id_fundo = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Fundo", id))
}

async fn fetch_relatorios(conn: &mut PgConnection, id: i64) -> Result<Vec<RelatorioRow>, DatabaseError> {
    let rows = sqlx::query_as::<_, RelatorioRow>(
        r#"
        SELECT r.id, r.nome, r.descricao, r.ativo
        FROM relatorios r
        JOIN fundo_relatorios fr ON fr.relatorio_id = r.id
        WHERE fr.fundo_id = $1
        ORDER BY r.nome
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

async fn insert_links(conn: &mut PgConnection, id: i64, relatorios: &[i64]) -> Result<(), DatabaseError> {
    if relatorios.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO fundo_relatorios (fundo_id, relatorio_id)
        SELECT $1, relatorio_id FROM UNNEST($2::bigint[]) AS relatorio_id
        ON CONFLICT (fundo_id, relatorio_id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(relatorios)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn replace_links(conn: &mut PgConnection, id: i64, relatorios: &[i64]) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM fundo_relatorios WHERE fundo_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    insert_links(conn, id, relatorios).await
}

/// Database row for a fund
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FundoRow {
    pub id_fundo: i64,
    pub st_cnpj_fundo: String,
    pub st_classe_fundo: String,
    pub st_estrategia_fundo: String,
    pub st_obs_fundo: Option<String>,
    pub cod_quantum_fundomaster: Option<i32>,
    pub st_cnpj_fundomaster: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fund row with the names of its linked reports
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FundoListRow {
    #[sqlx(flatten)]
    pub fundo: FundoRow,
    pub relatorios_nomes: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    fundo: FundoRow,
    inserted: bool,
}
