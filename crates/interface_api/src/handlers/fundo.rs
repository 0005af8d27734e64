//! Fund handlers

use axum::{extract::State, http::StatusCode, Json};

use core_kernel::FundoId;
use domain_fundo::UpdateMode;

use crate::dto::fundo::*;
use crate::dto::relatorio::RelatorioResponse;
use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::AppState;

/// Lists funds matching the query filters, newest first
pub async fn list_fundos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FundoQuery>,
) -> Result<Json<Vec<FundoListItem>>, ApiError> {
    let fundos = state.service.list(query.into()).await?;
    Ok(Json(fundos.into_iter().map(Into::into).collect()))
}

/// Creates a fund
pub async fn create_fundo(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FundoWriteRequest>,
) -> Result<(StatusCode, Json<FundoResponse>), ApiError> {
    let (changes, relatorios_ids) = request.into_changes()?;
    let created = state
        .service
        .create(changes, relatorios_ids.unwrap_or_default())
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Gets a fund with its linked reports
pub async fn get_fundo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FundoId>,
) -> Result<Json<FundoResponse>, ApiError> {
    Ok(Json(state.service.get(id).await?.into()))
}

/// Replaces a fund; every required field must be present
pub async fn update_fundo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FundoId>,
    ApiJson(request): ApiJson<FundoWriteRequest>,
) -> Result<Json<FundoResponse>, ApiError> {
    write(state, id, request, UpdateMode::Full).await
}

/// Updates the supplied fields of a fund
pub async fn patch_fundo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FundoId>,
    ApiJson(request): ApiJson<FundoWriteRequest>,
) -> Result<Json<FundoResponse>, ApiError> {
    write(state, id, request, UpdateMode::Partial).await
}

async fn write(
    state: AppState,
    id: FundoId,
    request: FundoWriteRequest,
    mode: UpdateMode,
) -> Result<Json<FundoResponse>, ApiError> {
    let (changes, relatorios_ids) = request.into_changes()?;
    let updated = state.service.update(id, changes, relatorios_ids, mode).await?;
    Ok(Json(updated.into()))
}

/// Deletes a fund and its report links
pub async fn delete_fundo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FundoId>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reports linked to a fund
pub async fn list_fundo_relatorios(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FundoId>,
) -> Result<Json<Vec<RelatorioResponse>>, ApiError> {
    let relatorios = state.service.linked_relatorios(id).await?;
    Ok(Json(relatorios.into_iter().map(Into::into).collect()))
}

/// Distinct fund classes in use
pub async fn list_classes(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.service.classes().await?))
}

/// Distinct fund strategies in use
pub async fn list_estrategias(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.service.estrategias().await?))
}
