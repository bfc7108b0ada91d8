//! Campaigns, customer sheet uploads and campaign listings.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiFailure;
use crate::extract::{CurrentCompany, Payload};
use crate::state::{now, AgentRow, AppState, CampaignAgentRow, CampaignRow, CustomerRow};

#[derive(Deserialize)]
pub struct NewCampaign {
    pub name: String,
    pub email: String,
    #[serde(default = "paused")]
    pub status: String,
}

fn paused() -> String {
    "Paused".to_string()
}

pub async fn create_campaign(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    Payload(input): Payload<NewCampaign>,
) -> Result<Json<CampaignRow>, ApiFailure> {
    let mut db = state.db.write().await;
    let row = CampaignRow {
        id: db.next_id(),
        name: input.name,
        email: input.email,
        status: input.status,
        created_at: now(),
        company_id: company.id,
    };
    db.campaigns.push(row.clone());
    tracing::info!(id = row.id, company_id = company.id, "campaign created");
    Ok(Json(row))
}

#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    pub id: i64,
    pub name: String,
    pub created_at: chrono::NaiveDateTime,
    pub company_id: i64,
    pub campaign_id: i64,
    pub agents: Vec<AgentRow>,
}

fn required<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str, ApiFailure> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ApiFailure::invalid_field("body", name, "Field required"))
}

fn integer(fields: &HashMap<String, String>, name: &str) -> Result<i64, ApiFailure> {
    required(fields, name)?.trim().parse().map_err(|_| {
        ApiFailure::invalid_field("body", name, "Input should be a valid integer")
    })
}

/// `(name, phone)` rows of a CSV sheet with a header line naming its columns.
pub fn parse_customer_sheet(text: &str) -> Vec<(String, String)> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let name_at = columns.iter().position(|c| *c == "name");
    let phone_at = columns.iter().position(|c| *c == "phone");

    lines
        .map(|line| {
            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            let cell = |at: Option<usize>| {
                at.and_then(|i| cells.get(i))
                    .map(|s| s.to_string())
                    .unwrap_or_default()
            };
            (cell(name_at), cell(phone_at))
        })
        .collect()
}

/// Multipart upload: creates a campaign-agent group, its agents and one
/// customer per sheet row.
pub async fn register_customer_data(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    mut multipart: Multipart,
) -> Result<Json<CampaignDetail>, ApiFailure> {
    let mut fields = HashMap::new();
    let mut sheet: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "csv_file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            sheet = Some((filename, field.bytes().await?.to_vec()));
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    let name = required(&fields, "name")?.to_string();
    let campaign_id = integer(&fields, "campaign_id")?;
    let company_id = integer(&fields, "company_id")?;
    let agents = required(&fields, "agents")?;
    let (filename, bytes) =
        sheet.ok_or_else(|| ApiFailure::invalid_field("body", "csv_file", "Field required"))?;

    if company.id != company_id && !company.is_admin() {
        return Err(ApiFailure::Forbidden("Not authorized".to_string()));
    }

    let mut db = state.db.write().await;
    let group = CampaignAgentRow {
        id: db.next_id(),
        name,
        created_at: now(),
        company_id,
        campaign_id,
    };

    let mut created = Vec::new();
    for agent in agents.split(',').map(str::trim) {
        let row = AgentRow {
            id: db.next_id(),
            name: agent.to_string(),
            company_id,
            campaign_agents_id: group.id,
            campaign_id,
        };
        db.agents.push(row.clone());
        created.push(row);
    }

    let rows = if filename.ends_with(".csv") {
        parse_customer_sheet(&String::from_utf8_lossy(&bytes))
    } else {
        tracing::warn!(%filename, "unsupported sheet format, no customers imported");
        Vec::new()
    };
    let imported = rows.len();
    for (customer_name, phone) in rows {
        let id = db.next_id();
        db.customers.push(CustomerRow {
            id,
            name: Some(customer_name),
            phone,
            email: None,
            status: "pending".to_string(),
            customer_interest: None,
            campaign_id: Some(campaign_id),
            campaign_agents_id: Some(group.id),
            conversation: None,
        });
    }

    tracing::info!(
        group = group.id,
        campaign_id,
        agents = created.len(),
        imported,
        "customer sheet imported"
    );
    let detail = CampaignDetail {
        id: group.id,
        name: group.name.clone(),
        created_at: group.created_at,
        company_id,
        campaign_id,
        agents: created,
    };
    db.campaign_agents.push(group);
    Ok(Json(detail))
}

fn visible<'a>(
    campaigns: &'a [CampaignRow],
    company: &'a crate::state::CompanyRow,
) -> impl Iterator<Item = &'a CampaignRow> {
    campaigns
        .iter()
        .filter(move |c| company.is_admin() || c.company_id == company.id)
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
) -> Json<Vec<Value>> {
    let db = state.db.read().await;
    Json(
        visible(&db.campaigns, &company)
            .map(|c| json!({ "id": c.id, "name": c.name }))
            .collect(),
    )
}

pub async fn list_campaign_stats(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
) -> Json<Vec<Value>> {
    let db = state.db.read().await;
    let stats = visible(&db.campaigns, &company)
        .map(|campaign| {
            let customers: Vec<&CustomerRow> = db
                .customers
                .iter()
                .filter(|c| c.campaign_id == Some(campaign.id))
                .collect();
            let count = |interest: &str| {
                customers
                    .iter()
                    .filter(|c| {
                        c.customer_interest
                            .as_deref()
                            .is_some_and(|i| i.eq_ignore_ascii_case(interest))
                    })
                    .count()
            };
            json!({
                "id": campaign.id,
                "name": campaign.name,
                "email": campaign.email,
                "created_at": campaign.created_at,
                "status": campaign.status,
                "company_id": campaign.company_id,
                "total_customers": customers.len(),
                "interested_customers": count("interested"),
                "not_interested_customers": count("not interested"),
                "maybe_customers": count("maybe"),
            })
        })
        .collect();
    Json(stats)
}

pub async fn list_customers(
    State(state): State<AppState>,
    CurrentCompany(company): CurrentCompany,
    Path(campaign_id): Path<i64>,
) -> Json<Vec<Value>> {
    let db = state.db.read().await;
    let owned = visible(&db.campaigns, &company).any(|c| c.id == campaign_id);
    if !owned {
        return Json(Vec::new());
    }
    Json(
        db.customers
            .iter()
            .filter(|c| c.campaign_id == Some(campaign_id))
            .map(|c| {
                json!({
                    "id": c.id,
                    "name": c.name,
                    "phone": c.phone,
                    "status": c.status,
                    "conversation": c.conversation,
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_columns_follow_header() {
        let rows = parse_customer_sheet("phone,name\n555,Ann\n\n556, Bob \n");
        assert_eq!(
            rows,
            vec![
                ("Ann".to_string(), "555".to_string()),
                ("Bob".to_string(), "556".to_string()),
            ]
        );
    }

    #[test]
    fn sheet_without_rows_is_empty() {
        assert!(parse_customer_sheet("").is_empty());
        assert!(parse_customer_sheet("name,phone\n").is_empty());
    }

    #[test]
    fn missing_column_reads_as_empty() {
        let rows = parse_customer_sheet("name\nAnn\n");
        assert_eq!(rows, vec![("Ann".to_string(), String::new())]);
    }
}
