//! Customer handlers
//!
//! Requests that run existence checks get a cancellation token bound to the
//! configured request deadline (`API_REQUEST_TIMEOUT_MS`). When the deadline
//! passes, pending checks stop and the request fails with 503.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::warn;

use core_kernel::CustomerId;

use crate::dto::customer::*;
use crate::extract::{operation_metadata, ValidatedJson, ValidatedQuery};
use crate::{error::ApiError, AppState};

/// Token cancelled at the request deadline
///
/// The guard cancels the token when the handler finishes, which also ends
/// the deadline timer.
fn request_token(state: &AppState) -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();

    if let Some(timeout) = state.config.request_timeout() {
        let deadline = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = deadline.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    warn!(timeout_ms = timeout.as_millis() as u64, "request deadline reached");
                    deadline.cancel();
                }
            }
        });
    }

    let guard = token.clone().drop_guard();
    (token, guard)
}

fn parse_id(raw: &str) -> Result<CustomerId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid customer id", raw)))
}

/// Creates an individual customer
pub async fn create_individual(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<CreateIndividualCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let (cancel, _guard) = request_token(&state);

    let customer = state
        .service
        .create(request.into(), operation_metadata(&headers), &cancel)
        .await?;

    let today = state.service.today();
    Ok((StatusCode::CREATED, Json(CustomerResponse::new(customer, today))))
}

/// Creates a corporate customer
pub async fn create_corporate(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<CreateCorporateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let (cancel, _guard) = request_token(&state);

    let customer = state
        .service
        .create(request.into(), operation_metadata(&headers), &cancel)
        .await?;

    let today = state.service.today();
    Ok((StatusCode::CREATED, Json(CustomerResponse::new(customer, today))))
}

/// Lists active individual customers
pub async fn list_individual(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedQuery(params): ValidatedQuery<ListIndividualCustomersParams>,
) -> Result<Json<CustomerPageResponse>, ApiError> {
    let page_size = state.config.page_size(params.page_size);
    let page = state
        .service
        .list(params.into_query(page_size), operation_metadata(&headers))
        .await?;

    Ok(Json(CustomerPageResponse::new(page, state.service.today())))
}

/// Lists active corporate customers
pub async fn list_corporate(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedQuery(params): ValidatedQuery<ListCorporateCustomersParams>,
) -> Result<Json<CustomerPageResponse>, ApiError> {
    let page_size = state.config.page_size(params.page_size);
    let page = state
        .service
        .list(params.into_query(page_size), operation_metadata(&headers))
        .await?;

    Ok(Json(CustomerPageResponse::new(page, state.service.today())))
}

/// Gets an active customer by ID
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state
        .service
        .get(parse_id(&id)?, operation_metadata(&headers))
        .await?;

    Ok(Json(CustomerResponse::new(customer, state.service.today())))
}

/// Replaces the contact information of a customer
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<ContactRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let id = parse_id(&id)?;
    let (cancel, _guard) = request_token(&state);

    let customer = state
        .service
        .update_contact(id, request.into(), operation_metadata(&headers), &cancel)
        .await?;

    Ok(Json(CustomerResponse::new(customer, state.service.today())))
}

/// Soft-deletes a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete(parse_id(&id)?, operation_metadata(&headers))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
