//! Domain DTOs for the campaign API.
//!
//! # Design
//! These mirror the server's response schemas but are defined independently
//! of the mock-server crate; integration tests catch schema drift. Response
//! types ignore unknown fields so server additions do not break parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Request payload for registering a company account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterCompany {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// A company account as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "user".to_string()
}

/// Successful login. `access_token` is what gets persisted under the token key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub com_id: Option<i64>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangePassword {
    pub username: String,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForgotPasswordResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyOtp {
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetPassword {
    pub username: String,
    pub new_password: String,
}

/// Generic `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

/// Request payload for `POST /campaigns/new_campaigns`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCampaign {
    pub name: String,
    pub email: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "Paused".to_string()
}

/// A campaign row as created by `new_campaigns`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
}

/// A campaign created from an uploaded customer sheet, with its agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignDetail {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub company_id: i64,
    pub campaign_id: i64,
    #[serde(default)]
    pub agents: Vec<Agent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
    pub campaign_agents_id: i64,
    pub campaign_id: i64,
}

/// `GET /campaigns/get` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignName {
    pub id: i64,
    pub name: String,
}

/// `GET /campaigns/get_campaign` entry: a campaign with customer counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignStats {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub total_customers: i64,
    pub interested_customers: i64,
    pub not_interested_customers: i64,
    pub maybe_customers: i64,
}

/// A customer row of one campaign. Every column but `id` is nullable
/// server-side and relayed as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conversation: Option<String>,
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// What a call run targets: every customer of a campaign, or of one
/// campaign agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallTarget {
    Campaign,
    Agent,
}

/// Request payload for `POST /make_call`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallPayload {
    pub id: i64,
    #[serde(rename = "type")]
    pub target: CallTarget,
}

/// Monthly call metrics. `avg_duration` is preformatted (`"3m 12s"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentMetrics {
    pub total_calls: i64,
    pub avg_duration: String,
    pub success_rate: f64,
    pub conversion_rate: f64,
}

/// A voice agent as listed through the server-side provider proxy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceAgent {
    pub agent_id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewLead {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One lead of a campaign with its classified interest, conversations and
/// call logs. Conversations and call logs are relayed as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadReport {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_interest: Option<String>,
    #[serde(default)]
    pub conversations: Vec<Value>,
    #[serde(default)]
    pub call_logs: Vec<Value>,
}

/// Customer sheet upload for `POST /campaigns/` (sent as multipart).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerUpload {
    pub name: String,
    pub campaign_id: i64,
    pub company_id: i64,
    /// Agent names; sent comma-joined.
    pub agents: Vec<String>,
    pub csv_file: Attachment,
}

/// A file part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn csv(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "text/csv".to_string(),
            bytes: bytes.into(),
        }
    }
}
