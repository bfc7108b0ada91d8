//! In-memory tables standing in for the backend database.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct CompanyRow {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    /// Kept in clear; this server only ever sees test credentials.
    pub password: String,
    pub role: String,
}

impl CompanyRow {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OtpStatus {
    Created,
    Verified,
    Used,
}

#[derive(Clone, Debug)]
pub struct OtpRow {
    pub username: String,
    pub otp: String,
    pub status: OtpStatus,
}

#[derive(Clone, Debug, Serialize)]
pub struct CampaignRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub company_id: i64,
}

/// A campaign-agent group created by a customer sheet upload.
#[derive(Clone, Debug)]
pub struct CampaignAgentRow {
    pub id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub company_id: i64,
    pub campaign_id: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct AgentRow {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
    pub campaign_agents_id: i64,
    pub campaign_id: i64,
}

#[derive(Clone, Debug)]
pub struct CustomerRow {
    pub id: i64,
    pub name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub status: String,
    pub customer_interest: Option<String>,
    pub campaign_id: Option<i64>,
    pub campaign_agents_id: Option<i64>,
    pub conversation: Option<String>,
}

/// A provider call record, as imported from the telephony side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallLog {
    pub sid: String,
    pub from_number: String,
    pub to_number: String,
    pub status: String,
    pub start_time: NaiveDateTime,
    pub duration: Option<i64>,
}

#[derive(Debug, Default)]
pub struct Tables {
    next_id: i64,
    pub companies: Vec<CompanyRow>,
    /// token -> company id
    pub sessions: Vec<(String, i64)>,
    pub otps: Vec<OtpRow>,
    pub campaigns: Vec<CampaignRow>,
    pub campaign_agents: Vec<CampaignAgentRow>,
    pub agents: Vec<AgentRow>,
    pub customers: Vec<CustomerRow>,
    pub call_logs: Vec<CallLog>,
}

impl Tables {
    /// Ids are unique across tables, starting at 1.
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn company(&self, id: i64) -> Option<&CompanyRow> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn company_by_username(&self, username: &str) -> Option<&CompanyRow> {
        self.companies.iter().find(|c| c.username == username)
    }

    pub fn issue_token(&mut self, company_id: i64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.push((token.clone(), company_id));
        token
    }

    pub fn session(&self, token: &str) -> Option<i64> {
        self.sessions
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, id)| *id)
    }
}

pub type Db = Arc<RwLock<Tables>>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub(crate) db: Db,
    pub(crate) voice_agent_key: Option<String>,
}

impl AppState {
    /// `voice_agent_key` is the provider key the agent listing proxies with;
    /// `None` makes that route answer 503.
    pub fn new(voice_agent_key: Option<String>) -> Self {
        Self {
            db: Arc::new(RwLock::new(Tables::default())),
            voice_agent_key,
        }
    }

    /// The most recent OTP issued for `username`, whatever its status.
    pub async fn latest_otp(&self, username: &str) -> Option<String> {
        let db = self.db.read().await;
        db.otps
            .iter()
            .rev()
            .find(|o| o.username == username)
            .map(|o| o.otp.clone())
    }

    /// Insert a provider call record, the way the call-log import does.
    pub async fn record_call(&self, call: CallLog) {
        self.db.write().await.call_logs.push(call);
    }

    /// Set a customer's classified interest, as the conversation analysis does.
    pub async fn set_interest(&self, customer_id: i64, interest: &str) -> bool {
        let mut db = self.db.write().await;
        match db.customers.iter_mut().find(|c| c.id == customer_id) {
            Some(customer) => {
                customer.customer_interest = Some(interest.to_string());
                true
            }
            None => false,
        }
    }
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Digits only, so `+1 (555) 010` and `1555010` match.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_across_tables() {
        let mut tables = Tables::default();
        assert_eq!(tables.next_id(), 1);
        assert_eq!(tables.next_id(), 2);
    }

    #[test]
    fn tokens_resolve_to_their_company() {
        let mut tables = Tables::default();
        let a = tables.issue_token(1);
        let b = tables.issue_token(2);
        assert_ne!(a, b);
        assert_eq!(tables.session(&a), Some(1));
        assert_eq!(tables.session(&b), Some(2));
        assert_eq!(tables.session("null"), None);
    }

    #[test]
    fn normalize_phone_keeps_digits() {
        assert_eq!(normalize_phone("+1 (555) 010-22"), "155501022");
        assert_eq!(normalize_phone(""), "");
    }

    #[tokio::test]
    async fn latest_otp_prefers_newest() {
        let state = AppState::new(None);
        {
            let mut db = state.db.write().await;
            for otp in ["111111", "222222"] {
                db.otps.push(OtpRow {
                    username: "acme".to_string(),
                    otp: otp.to_string(),
                    status: OtpStatus::Created,
                });
            }
        }
        assert_eq!(state.latest_otp("acme").await.as_deref(), Some("222222"));
        assert_eq!(state.latest_otp("nobody").await, None);
    }
}
