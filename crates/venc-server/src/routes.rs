use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
        Path, Query as Params, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use venc_db::Connection;
use venc_domain::{
    DueItem,
    DueItemChange,
    DueItemFilter,
    Insert,
    NewDueItem,
    Query,
    Retrieve,
    Update,
};

use crate::error::ApiError;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Connection,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_items))
        .route("/health", get(health))
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", get(get_item))
        .route("/items/:id/due-date", patch(set_due_date))
        .route("/items/:id/responsible", patch(set_responsible))
        .route("/items/:id/payment", patch(record_payment))
        .with_state(state)
}

/// Query string of the item list
#[derive(Debug, Default, Deserialize)]
pub struct ListItems {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub paid: Option<bool>,
    pub responsible: Option<String>,
}

impl From<ListItems> for DueItemFilter {
    fn from(params: ListItems) -> Self {
        DueItemFilter {
            due_from: params.from,
            due_to: params.to,
            paid: params.paid,
            responsible: params.responsible,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetDueDate {
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SetResponsible {
    pub responsible: String,
}

/// The amount may be left out or null, or the body may be
/// empty; nothing is recorded then.
#[derive(Debug, Default, Deserialize)]
pub struct RecordPayment {
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Ids outside the store's range cannot name an item.
fn item_id(id: i64) -> Result<u32, ApiError> {
    u32::try_from(id).map_err(|_| ApiError::NotFound)
}

fn check_amount(name: &str, amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ApiError::invalid(format!(
            "{} must be a non-negative number", name)));
    }
    Ok(())
}

fn check_new_item(item: &NewDueItem) -> Result<(), ApiError> {
    if item.description.trim().is_empty() {
        return Err(ApiError::invalid("description must not be empty"));
    }
    check_amount("debt_amount", item.debt_amount)?;
    if let Some(amount) = item.paid_amount {
        check_amount("paid_amount", amount)?;
    }
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_items(
    State(state): State<AppState>,
    params: Result<Params<ListItems>, QueryRejection>,
) -> Result<Json<Vec<DueItem>>, ApiError> {
    let Params(params) = params?;
    let filter = DueItemFilter::from(params);
    let items: Vec<DueItem> = state.db.query(&filter).await?;
    Ok(Json(items))
}

async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<NewDueItem>, JsonRejection>,
) -> Result<(StatusCode, Json<DueItem>), ApiError> {
    let Json(item) = payload?;
    check_new_item(&item)?;
    let item: DueItem = state.db.insert(item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DueItem>, ApiError> {
    let Path(id) = id?;
    let id = item_id(id)?;
    let item: DueItem = state.db.retrieve(id).await?;
    Ok(Json(item))
}

async fn set_due_date(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SetDueDate>, JsonRejection>,
) -> Result<Json<DueItem>, ApiError> {
    let Path(id) = id?;
    let id = item_id(id)?;
    let Json(body) = payload?;
    let item: DueItem = state.db
        .update(id, DueItemChange::DueDate(body.due_date))
        .await?;
    Ok(Json(item))
}

async fn set_responsible(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SetResponsible>, JsonRejection>,
) -> Result<Json<DueItem>, ApiError> {
    let Path(id) = id?;
    let id = item_id(id)?;
    let Json(body) = payload?;
    let item: DueItem = state.db
        .update(id, DueItemChange::Responsible(body.responsible))
        .await?;
    Ok(Json(item))
}

async fn record_payment(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Bytes, BytesRejection>,
) -> Result<Json<DueItem>, ApiError> {
    let Path(id) = id?;
    let id = item_id(id)?;
    let payload = payload?;
    // An empty body records nothing
    let body = if payload.is_empty() {
        RecordPayment::default()
    } else {
        let Json(body) = Json::<RecordPayment>::from_bytes(&payload)?;
        body
    };
    if let Some(amount) = body.amount {
        check_amount("amount", amount)?;
    }
    let item: DueItem = state.db
        .update(id, DueItemChange::Payment(body.amount))
        .await?;
    Ok(Json(item))
}
