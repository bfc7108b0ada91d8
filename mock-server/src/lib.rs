//! In-memory stand-in for the campaign backend.
//!
//! Serves the routes the client core calls, with the same paths, payloads
//! and `{"detail": ...}` error bodies. State lives in one `RwLock`-guarded
//! set of tables and is lost on exit.

use std::str::FromStr;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;

mod auth;
mod calls;
mod campaigns;
pub mod error;
mod extract;
mod leads;
pub mod state;

pub use error::ApiFailure;
pub use state::{AppState, CallLog};

pub const PORT_ENV: &str = "PORT";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
pub const VOICE_AGENT_KEY_ENV: &str = "VOICE_AGENT_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: LevelFilter,
    pub voice_agent_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: LevelFilter::INFO,
            voice_agent_key: None,
        }
    }
}

impl Config {
    /// Reads `.env` (if any) then the process environment. Unparseable
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(%err, "no .env loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            port: set(PORT_ENV)
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            log_level: set(LOG_LEVEL_ENV)
                .and_then(|l| LevelFilter::from_str(l.trim()).ok())
                .unwrap_or(defaults.log_level),
            voice_agent_key: set(VOICE_AGENT_KEY_ENV),
        }
    }
}

/// Router over fresh state with no provider key.
pub fn app() -> Router {
    app_with_state(AppState::new(None))
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/companies/", post(auth::register_company))
        .route("/auth/login", post(auth::login))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/campaigns/new_campaigns", post(campaigns::create_campaign))
        .route("/campaigns/", post(campaigns::register_customer_data))
        .route("/campaigns/get", get(campaigns::list_campaigns))
        .route("/campaigns/get_campaign", get(campaigns::list_campaign_stats))
        .route(
            "/campaigns/{campaign_id}/customers",
            get(campaigns::list_customers),
        )
        .route("/make_call", post(calls::make_call))
        .route("/make_call/", post(calls::make_call))
        .route("/agent-metrics/", get(calls::agent_metrics))
        .route("/agents/", get(calls::list_agents))
        .route("/api/leadrat/variables/", get(leads::lead_variables))
        .route("/api/get_data/{campaign_id}", get(leads::fetch_leads))
        .route("/api/add_data/", post(leads::add_lead))
        .route("/leads/{lead_id}/", get(leads::delete_lead))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "message": "Campaign API is running" }))
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, LevelFilter::INFO);
        assert!(config.voice_agent_key.is_none());
    }

    #[test]
    fn environment_overrides() {
        let config = config(&[
            ("PORT", "8081"),
            ("LOG_LEVEL", "debug"),
            ("VOICE_AGENT_API_KEY", "sk_test"),
        ]);
        assert_eq!(config.port, 8081);
        assert_eq!(config.log_level, LevelFilter::DEBUG);
        assert_eq!(config.voice_agent_key.as_deref(), Some("sk_test"));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config(&[("PORT", "http"), ("LOG_LEVEL", "loud"), ("VOICE_AGENT_API_KEY", " ")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, LevelFilter::INFO);
        assert!(config.voice_agent_key.is_none());
    }
}
