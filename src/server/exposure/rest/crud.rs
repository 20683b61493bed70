//! Generic CRUD handlers shared by every record type
//!
//! Each handler enforces the route's [`AuthPolicy`](crate::core::AuthPolicy)
//! before touching storage. Write bodies are read as raw bytes and parsed
//! here so malformed JSON reports through [`LedgerError`] like any other
//! validation failure.

use crate::core::error::{LedgerError, LedgerResult, RequestError};
use crate::core::{
    AuthContext, DataService, EntityPolicies, ListFilter, PaginatedResponse, QueryParams, Record,
};
use crate::export::to_csv;
use crate::server::context::ApiContext;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Handler state for one record type
pub struct CrudState<T: Record> {
    pub service: Arc<dyn DataService<T>>,
    pub policies: Arc<EntityPolicies>,
    pub context: Arc<ApiContext>,
}

impl<T: Record> Clone for CrudState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            policies: self.policies.clone(),
            context: self.context.clone(),
        }
    }
}

impl<T: Record> CrudState<T> {
    pub fn new(
        service: Arc<dyn DataService<T>>,
        policies: EntityPolicies,
        context: Arc<ApiContext>,
    ) -> Self {
        Self {
            service,
            policies: Arc::new(policies),
            context,
        }
    }
}

pub(crate) fn parse_id(raw: &str) -> LedgerResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        RequestError::InvalidEntityId {
            id: raw.to_string(),
        }
        .into()
    })
}

/// Parse and validate a JSON body
fn parse_body<P: DeserializeOwned + Validate>(body: &Bytes) -> LedgerResult<P> {
    let payload: P = serde_json::from_slice(body)?;
    payload.validate()?;
    Ok(payload)
}

/// One record inside the caller's scope
///
/// Records outside it read as missing so their ids are not confirmed.
async fn load_visible<T: Record>(
    state: &CrudState<T>,
    auth: &AuthContext,
    id: Uuid,
) -> LedgerResult<T> {
    let filter = ListFilter::scoped(state.context.record_scope(auth, &QueryParams::default())?);
    state
        .service
        .get(&id)
        .await?
        .filter(|record| filter.matches(record))
        .ok_or_else(|| LedgerError::not_found(T::resource_name_singular(), id))
}

async fn load_scoped<T: Record>(
    state: &CrudState<T>,
    headers: &HeaderMap,
    params: &QueryParams,
) -> LedgerResult<Vec<T>> {
    let auth = state.context.authorize(&state.policies.list, headers).await?;
    let filter = state.context.list_filter(&auth, params)?;

    let mut records = state.service.list(&filter).await?;
    if let Some(sort) = params.sort_spec() {
        sort.apply(&mut records);
    }
    Ok(records)
}

/// `GET /api/{plural}`
pub async fn list_records<T: Record>(
    State(state): State<CrudState<T>>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> LedgerResult<Json<PaginatedResponse<T>>> {
    let records = load_scoped(&state, &headers, &params).await?;
    tracing::debug!(
        entity = T::resource_name_singular(),
        count = records.len(),
        "listed records"
    );

    Ok(Json(PaginatedResponse::paginate(
        records,
        params.page(),
        params.limit(),
    )))
}

/// `GET /api/{plural}/export.csv`
pub async fn export_records<T: Record>(
    State(state): State<CrudState<T>>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> LedgerResult<Response> {
    let records = load_scoped(&state, &headers, &params).await?;
    let disposition = format!("attachment; filename=\"{}.csv\"", T::resource_name());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        to_csv(&records),
    )
        .into_response())
}

/// `GET /api/{plural}/{id}[?include=a,b]`
pub async fn get_record<T: Record>(
    State(state): State<CrudState<T>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<QueryParams>,
) -> LedgerResult<Json<Value>> {
    let auth = state.context.authorize(&state.policies.get, &headers).await?;
    let id = parse_id(&id)?;
    let record = load_visible(&state, &auth, id).await?;

    let value = state
        .context
        .resolve_includes(&record, &params.includes())
        .await?;
    Ok(Json(value))
}

/// `POST /api/{plural}`
pub async fn create_record<T: Record>(
    State(state): State<CrudState<T>>,
    headers: HeaderMap,
    body: Bytes,
) -> LedgerResult<(StatusCode, Json<T>)> {
    let auth = state.context.authorize(&state.policies.create, &headers).await?;
    let input: T::Create = parse_body(&body)?;

    let author = auth.user_id().unwrap_or_else(Uuid::nil);
    let record = T::from_create(input, author);
    state.context.check_references(&record).await?;

    let created = state.service.create(record).await?;
    tracing::info!(
        entity = T::resource_name_singular(),
        id = %created.id(),
        author = %author,
        "record created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/{plural}/{id}` with a partial body
pub async fn update_record<T: Record>(
    State(state): State<CrudState<T>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> LedgerResult<Json<T>> {
    let auth = state.context.authorize(&state.policies.update, &headers).await?;
    let id = parse_id(&id)?;
    let input: T::Update = parse_body(&body)?;

    let mut record = load_visible(&state, &auth, id).await?;

    record.apply_update(input);
    state.context.check_references(&record).await?;
    record.touch();

    let updated = state.service.update(&id, record).await?;
    tracing::info!(entity = T::resource_name_singular(), id = %id, "record updated");

    Ok(Json(updated))
}

/// `DELETE /api/{plural}/{id}`
pub async fn delete_record<T: Record>(
    State(state): State<CrudState<T>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> LedgerResult<StatusCode> {
    let auth = state.context.authorize(&state.policies.delete, &headers).await?;
    let id = parse_id(&id)?;

    load_visible(&state, &auth, id).await?;
    state.service.delete(&id).await?;
    tracing::info!(entity = T::resource_name_singular(), id = %id, "record deleted");

    Ok(StatusCode::NO_CONTENT)
}
