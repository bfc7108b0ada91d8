//! Outbound call runs, monthly call metrics and the voice-agent proxy.

use axum::extract::State;
use axum::Json;
use chrono::Datelike;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiFailure;
use crate::extract::{CurrentCompany, Payload, QueryParams};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CallPayload {
    pub id: i64,
    #[serde(rename = "type")]
    pub target: String,
}

/// Places one call per eligible customer and marks it `Contacted`.
///
/// The provider is not modelled: every call succeeds.
pub async fn make_call(
    State(state): State<AppState>,
    Payload(payload): Payload<CallPayload>,
) -> Json<Value> {
    let mut db = state.db.write().await;
    let mut contacted = 0;
    for customer in db.customers.iter_mut() {
        let eligible = match payload.target.as_str() {
            "campaign" => customer.campaign_id == Some(payload.id),
            "agent" => {
                customer.campaign_agents_id == Some(payload.id) && customer.status != "completed"
            }
            _ => false,
        };
        if eligible {
            customer.status = "Contacted".to_string();
            contacted += 1;
        }
    }
    tracing::info!(kind = %payload.target, id = payload.id, contacted, "call run finished");
    Json(json!({ "message": "Call process completed" }))
}

#[derive(Deserialize)]
pub struct MetricsQuery {
    pub month_year: Option<String>,
}

fn is_month_year(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 7
        && bytes[4] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || b.is_ascii_digit())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub async fn agent_metrics(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<MetricsQuery>,
) -> Result<Json<Value>, ApiFailure> {
    let month_year = query
        .month_year
        .ok_or_else(|| ApiFailure::invalid_field("query", "month_year", "Field required"))?;
    if !is_month_year(&month_year) {
        return Err(ApiFailure::invalid_field(
            "query",
            "month_year",
            "String should match pattern '^\\d{4}-\\d{2}$'",
        ));
    }
    let invalid = || ApiFailure::BadRequest("Invalid month_year format. Use YYYY-MM.".to_string());
    let (year, month) = month_year.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }

    let db = state.db.read().await;
    let calls: Vec<_> = db
        .call_logs
        .iter()
        .filter(|c| c.start_time.year() == year && c.start_time.month() == month)
        .collect();

    if calls.is_empty() {
        return Ok(Json(json!({
            "total_calls": 0,
            "avg_duration": "0m 0s",
            "success_rate": 0.0,
            "conversion_rate": 0.0,
        })));
    }

    let total = calls.len();
    let successful = calls.iter().filter(|c| c.status == "completed").count();
    let seconds: i64 = calls.iter().map(|c| c.duration.unwrap_or(0)).sum();
    let average = seconds / total as i64;
    let success_rate = round2(successful as f64 / total as f64 * 100.0);

    Ok(Json(json!({
        "total_calls": total,
        "avg_duration": format!("{}m {}s", average / 60, average % 60),
        "success_rate": success_rate,
        "conversion_rate": success_rate,
    })))
}

/// Provider agents exposed through the proxy.
const VOICE_AGENTS: [(&str, &str); 4] = [
    ("agent_01jxz81z4jew7b5j5memx0xcxc", "Inbound English"),
    ("agent_01jy1w83waeeks5ycz7wk2bsrm", "Outbound English"),
    ("agent_01jy1wy726f1d89zzjc3pq342z", "Inbound Hindi"),
    ("agent_01jy1y877yfa1vd9w8z7pkp405", "Outbound Hindi"),
];

/// Lists provider voice agents. The provider key stays on this side.
pub async fn list_agents(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
) -> Result<Json<Vec<Value>>, ApiFailure> {
    if state.voice_agent_key.is_none() {
        return Err(ApiFailure::Unavailable(
            "Voice agent provider is not configured".to_string(),
        ));
    }
    tracing::debug!(company_id = company.id, "listing voice agents");
    Ok(Json(
        VOICE_AGENTS
            .iter()
            .map(|(agent_id, name)| json!({ "agent_id": agent_id, "name": name }))
            .collect(),
    ))
}
