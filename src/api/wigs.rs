use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use super::auth::AdminUser;
use super::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use super::AppState;
use crate::catalog::{ListParams, Scope, WigPage, WigQuery};
use crate::domain::aggregates::{NewWig, Wig, WigChange, WigPatch};
use crate::domain::events::{DomainEvent, WigEvent};
use crate::StoreError;

async fn list(s: &AppState, params: ListParams, scope: Scope) -> Result<Json<WigPage>, ApiError> {
    let query = WigQuery::from_params(params, scope).map_err(ApiError::fields)?;
    Ok(Json(s.wigs.list(&query).await?))
}

pub async fn list_public(State(s): State<AppState>, ApiQuery(p): ApiQuery<ListParams>) -> Result<Json<WigPage>, ApiError> {
    list(&s, p, Scope::Public).await
}

pub async fn list_admin(State(s): State<AppState>, _admin: AdminUser, ApiQuery(p): ApiQuery<ListParams>) -> Result<Json<WigPage>, ApiError> {
    list(&s, p, Scope::Admin).await
}

async fn load(s: &AppState, id: Uuid) -> Result<Wig, ApiError> {
    s.wigs.find(id).await?.ok_or_else(|| StoreError::WigNotFound(id).into())
}

pub async fn get_one(State(s): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Wig>, ApiError> {
    Ok(Json(load(&s, id).await?))
}

pub async fn create(State(s): State<AppState>, _admin: AdminUser, ApiJson(r): ApiJson<NewWig>) -> Result<(StatusCode, Json<Wig>), ApiError> {
    let mut wig = Wig::create(r)?;
    s.wigs.insert(&wig).await?;
    s.events.publish(wig.take_events()).await;
    Ok((StatusCode::CREATED, Json(wig)))
}

async fn modify(s: &AppState, id: Uuid, change: WigChange) -> Result<Json<Wig>, ApiError> {
    let mut wig = s.wigs.modify(id, change).await?;
    s.events.publish(wig.take_events()).await;
    Ok(Json(wig))
}

pub async fn update(State(s): State<AppState>, _admin: AdminUser, ApiPath(id): ApiPath<Uuid>, ApiJson(r): ApiJson<WigPatch>) -> Result<Json<Wig>, ApiError> {
    modify(&s, id, WigChange::Patch(r)).await
}

pub async fn remove(State(s): State<AppState>, _admin: AdminUser, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Value>, ApiError> {
    if !s.wigs.delete(id).await? { return Err(StoreError::WigNotFound(id).into()); }
    s.events.publish(vec![DomainEvent::Wig(WigEvent::Deleted { wig_id: id })]).await;
    Ok(Json(json!({ "message": "Wig deleted" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRequest { pub is_visible: bool }

pub async fn set_visibility(State(s): State<AppState>, _admin: AdminUser, ApiPath(id): ApiPath<Uuid>, ApiJson(r): ApiJson<VisibilityRequest>) -> Result<Json<Wig>, ApiError> {
    modify(&s, id, WigChange::Visibility(r.is_visible)).await
}
