use crate::errors::AppError;
use crate::models::{InsurerRecord, InsurerStatusView, SuccessResponse, UpdateInvoiceRequest};
use crate::overdue::{classify_at, due_date, format_last_invoice_date, OverdueThresholds};
use crate::state::AppState;
use crate::storage::records_from_json;
use crate::ui::{render_error, render_index};
use axum::{body::Bytes, extract::State, response::Html, Json};
use chrono::{Local, NaiveDateTime};
use serde_json::{json, Value};
use tracing::{error, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    match state.store.get_all().await {
        Ok(records) => {
            let views = build_status_views_at(&records, now(), state.thresholds);
            Html(render_index(&views))
        }
        Err(err) => {
            error!("failed to load insurers for index: {err}");
            Html(render_error(&err.to_string()))
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_insurers(
    State(state): State<AppState>,
) -> Result<Json<Vec<InsurerRecord>>, AppError> {
    Ok(Json(state.store.get_all().await?))
}

pub async fn replace_insurers(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let records =
        records_from_json(&body).inspect_err(|err| warn!("rejected insurer list: {err}"))?;
    state.store.replace_all(records).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let payload: UpdateInvoiceRequest = serde_json::from_slice(&body).map_err(|err| {
        warn!("rejected invoice update: {err}");
        AppError::bad_request(format!("expected {{insurerName, lastInvoiceDate}}: {err}"))
    })?;
    if payload.insurer_name.trim().is_empty() {
        return Err(AppError::bad_request("insurerName must not be empty"));
    }

    state
        .store
        .update_invoice_date(&payload.insurer_name, payload.last_invoice_date.trim())
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn get_statuses(
    State(state): State<AppState>,
) -> Result<Json<Vec<InsurerStatusView>>, AppError> {
    let records = state.store.get_all().await?;
    Ok(Json(build_status_views_at(&records, now(), state.thresholds)))
}

pub fn build_status_views_at(
    records: &[InsurerRecord],
    now: NaiveDateTime,
    thresholds: OverdueThresholds,
) -> Vec<InsurerStatusView> {
    records
        .iter()
        .map(|record| to_status_view(record, now, thresholds))
        .collect()
}

fn to_status_view(
    record: &InsurerRecord,
    now: NaiveDateTime,
    thresholds: OverdueThresholds,
) -> InsurerStatusView {
    let status = classify_at(record, now, thresholds);
    let normalized = record.normalized();
    InsurerStatusView {
        last_invoice: format_last_invoice_date(&normalized.last_invoice).to_string(),
        turnus: normalized.turnus,
        instructions: normalized.instructions,
        settlement_completed: normalized.settlement_completed,
        status: status.key(),
        color: status.color(),
        label: status.label(),
        days_overdue: status.days_overdue(),
        due_date: due_date(record).map(|due| due.date().format("%d.%m.%Y").to_string()),
        name: normalized.name,
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
