//! Lead data: reports per campaign, manual lead capture and deletion.

use std::cmp::Reverse;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiFailure;
use crate::extract::Payload;
use crate::state::{normalize_phone, AppState, CallLog, CustomerRow};

pub async fn lead_variables() -> Json<Value> {
    Json(json!({
        "variables": ["customer_name", "phone", "email", "campaign_name"],
    }))
}

/// `1h 2m 3s`, dropping zero units; zero is `0s`.
pub fn format_duration(seconds: Option<i64>) -> String {
    let Some(seconds) = seconds else {
        return "0s".to_string();
    };
    let (hours, rest) = (seconds / 3600, seconds % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

fn call_log_json(call: &CallLog) -> Value {
    json!({
        "sid": call.sid,
        "from_number": call.from_number,
        "to_number": call.to_number,
        "status": call.status,
        "start_time": call.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        "duration": format_duration(call.duration),
    })
}

fn lead_report(lead: &CustomerRow, call_logs: &[CallLog]) -> Value {
    let phone = normalize_phone(&lead.phone);
    let mut logs: Vec<&CallLog> = call_logs
        .iter()
        .filter(|c| normalize_phone(&c.to_number) == phone)
        .collect();
    logs.sort_by_key(|c| Reverse(c.start_time));

    json!({
        "id": lead.id,
        "name": lead.name,
        "phone": lead.phone,
        "status": lead.status,
        "customer_interest": lead.customer_interest.clone().unwrap_or_default(),
        "conversations": [],
        "call_logs": logs.into_iter().map(call_log_json).collect::<Vec<_>>(),
    })
}

pub async fn fetch_leads(
    State(state): State<AppState>,
    Path(campaign_id): Path<i64>,
) -> Json<Vec<Value>> {
    let db = state.db.read().await;
    Json(
        db.customers
            .iter()
            .filter(|c| c.campaign_id == Some(campaign_id))
            .map(|lead| lead_report(lead, &db.call_logs))
            .collect(),
    )
}

#[derive(Deserialize)]
pub struct NewLead {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn add_lead(
    State(state): State<AppState>,
    Payload(lead): Payload<NewLead>,
) -> Result<Json<Value>, ApiFailure> {
    let phone = lead.number.trim().to_string();
    if phone.is_empty() {
        return Err(ApiFailure::BadRequest("Phone number is required".to_string()));
    }

    let mut db = state.db.write().await;
    if db.customers.iter().any(|c| c.phone == phone) {
        return Err(ApiFailure::Conflict(
            "Lead with this phone number already exists".to_string(),
        ));
    }
    let id = db.next_id();
    db.customers.push(CustomerRow {
        id,
        name: lead.name,
        phone,
        email: lead.email,
        status: "Pending".to_string(),
        customer_interest: None,
        campaign_id: None,
        campaign_agents_id: None,
        conversation: None,
    });
    tracing::info!(id, "lead captured");
    Ok(Json(json!({ "message": "Lead saved successfully" })))
}

/// Deletes on GET; the frontend calls it that way.
pub async fn delete_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<i64>,
) -> Result<Json<Value>, ApiFailure> {
    let mut db = state.db.write().await;
    let index = db
        .customers
        .iter()
        .position(|c| c.id == lead_id)
        .ok_or_else(|| ApiFailure::NotFound("Lead not found".to_string()))?;
    db.customers.remove(index);
    Ok(Json(json!({ "message": "Lead deleted successfully" })))
}
