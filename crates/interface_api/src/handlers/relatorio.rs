//! Report handlers (read-only, active reports only)

use axum::{extract::State, Json};

use core_kernel::RelatorioId;

use crate::dto::relatorio::{RelatorioQuery, RelatorioResponse};
use crate::error::{ApiError, ApiPath, ApiQuery};
use crate::AppState;

pub async fn list_relatorios(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RelatorioQuery>,
) -> Result<Json<Vec<RelatorioResponse>>, ApiError> {
    let relatorios = state.service.list_relatorios(query.into()).await?;
    Ok(Json(relatorios.into_iter().map(Into::into).collect()))
}

pub async fn get_relatorio(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RelatorioId>,
) -> Result<Json<RelatorioResponse>, ApiError> {
    Ok(Json(state.service.get_relatorio(id).await?.into()))
}
