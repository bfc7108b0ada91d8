//! Stateless HTTP request builder and response settler for the campaign API.
//!
//! # Design
//! `CampaignClient` holds only a `base_url`. Every operation is a thin typed
//! wrapper over two generic helpers:
//!
//! - [`CampaignClient::request`] turns a [`Route`] plus [`Params`] into an
//!   `HttpRequest`. It is the only place headers are attached.
//! - [`settle`] turns an [`Exchange`] into a typed result under an explicit
//!   [`OnError`] policy.
//!
//! The caller executes the round-trip between the two, so the core stays
//! deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::error::{ApiError, ErrorPayload};
use crate::form::{self, MultipartForm};
use crate::http::{Exchange, HttpRequest};
use crate::route::{self, Auth, Route};
use crate::session::Session;
use crate::types::{
    AgentMetrics, CallPayload, CampaignDetail, CampaignName, CampaignRecord, CampaignStats,
    ChangePassword, Company, Customer, ForgotPasswordResponse, LeadReport, LoginResponse, Message,
    NewLead, RegisterCompany, ResetPassword, VerifyOtp, VoiceAgent,
};

/// Failure policy for one call site.
#[derive(Debug, Clone, PartialEq)]
pub enum OnError<T> {
    /// Return `ApiError::Rejected` with the server body or the route fallback.
    Propagate,
    /// Log the failure and return this value instead.
    DefaultValue(T),
}

/// An encoded request body with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Body {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Self {
            content_type: "application/json".to_string(),
            bytes,
        })
    }

    pub fn form(pairs: &[(&str, &str)]) -> Self {
        Self {
            content_type: "application/x-www-form-urlencoded".to_string(),
            bytes: form::urlencoded(pairs).into_bytes(),
        }
    }

    pub fn multipart(form: &MultipartForm) -> Self {
        Self {
            content_type: form.content_type(),
            bytes: form.encode(),
        }
    }
}

/// Per-call inputs of the generic request helper.
#[derive(Debug, Clone, Default)]
pub struct Params<'a> {
    /// Substituted for `{id}` in the route path.
    pub id: Option<i64>,
    pub query: Vec<(&'a str, &'a str)>,
    /// Only consulted for `Auth::Bearer` routes.
    pub session: Option<&'a Session>,
    pub body: Option<Body>,
}

/// Synchronous, stateless client for the campaign API.
#[derive(Debug, Clone)]
pub struct CampaignClient {
    base_url: String,
}

impl CampaignClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request for `route`.
    ///
    /// Bearer routes always get exactly one `authorization` header; without a
    /// session the token placeholder is used. Public routes never get one.
    pub fn request(&self, route: &Route, params: Params<'_>) -> HttpRequest {
        let path = match params.id {
            Some(id) => route.path.replace("{id}", &id.to_string()),
            None => route.path.to_string(),
        };
        let mut url = format!("{}{}", self.base_url, path);
        if !params.query.is_empty() {
            let mut query = form_urlencoded::Serializer::new(String::new());
            query.extend_pairs(params.query.iter());
            url.push('?');
            url.push_str(&query.finish());
        }

        let mut headers = Vec::new();
        if route.auth == Auth::Bearer {
            let authorization = match params.session {
                Some(session) => session.authorization(),
                None => Session::anonymous().authorization(),
            };
            headers.push(("authorization".to_string(), authorization));
        }

        let body = params.body.map(|body| {
            headers.push(("content-type".to_string(), body.content_type));
            body.bytes
        });

        tracing::debug!(method = route.method.as_str(), %url, "built request");
        HttpRequest {
            method: route.method,
            url,
            headers,
            body,
        }
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    pub fn build_register_company(&self, input: &RegisterCompany) -> Result<HttpRequest, ApiError> {
        Ok(self.request(
            &route::REGISTER_COMPANY,
            Params {
                body: Some(Body::json(input)?),
                ..Params::default()
            },
        ))
    }

    pub fn parse_register_company(&self, exchange: Exchange) -> Result<Company, ApiError> {
        settle(&route::REGISTER_COMPANY, OnError::Propagate, exchange)
    }

    /// Form-encoded `username=<u>&password=<p>`.
    pub fn build_login(&self, username: &str, password: &str) -> HttpRequest {
        self.request(
            &route::LOGIN,
            Params {
                body: Some(Body::form(&[("username", username), ("password", password)])),
                ..Params::default()
            },
        )
    }

    pub fn parse_login(&self, exchange: Exchange) -> Result<LoginResponse, ApiError> {
        settle(&route::LOGIN, OnError::Propagate, exchange)
    }

    pub fn build_change_password(
        &self,
        session: &Session,
        input: &ChangePassword,
    ) -> Result<HttpRequest, ApiError> {
        Ok(self.request(
            &route::CHANGE_PASSWORD,
            Params {
                session: Some(session),
                body: Some(Body::json(input)?),
                ..Params::default()
            },
        ))
    }

    pub fn parse_change_password(&self, exchange: Exchange) -> Result<Message, ApiError> {
        settle(&route::CHANGE_PASSWORD, OnError::Propagate, exchange)
    }

    /// The username travels as a query parameter; there is no body.
    pub fn build_forgot_password(&self, username: &str) -> HttpRequest {
        self.request(
            &route::FORGOT_PASSWORD,
            Params {
                query: vec![("username", username)],
                ..Params::default()
            },
        )
    }

    pub fn parse_forgot_password(
        &self,
        exchange: Exchange,
    ) -> Result<ForgotPasswordResponse, ApiError> {
        settle(&route::FORGOT_PASSWORD, OnError::Propagate, exchange)
    }

    pub fn build_verify_otp(&self, input: &VerifyOtp) -> Result<HttpRequest, ApiError> {
        Ok(self.request(
            &route::VERIFY_OTP,
            Params {
                body: Some(Body::json(input)?),
                ..Params::default()
            },
        ))
    }

    pub fn parse_verify_otp(&self, exchange: Exchange) -> Result<Message, ApiError> {
        settle(&route::VERIFY_OTP, OnError::Propagate, exchange)
    }

    pub fn build_reset_password(&self, input: &ResetPassword) -> Result<HttpRequest, ApiError> {
        Ok(self.request(
            &route::RESET_PASSWORD,
            Params {
                body: Some(Body::json(input)?),
                ..Params::default()
            },
        ))
    }

    pub fn parse_reset_password(&self, exchange: Exchange) -> Result<Message, ApiError> {
        settle(&route::RESET_PASSWORD, OnError::Propagate, exchange)
    }

    // -----------------------------------------------------------------------
    // Campaigns
    // -----------------------------------------------------------------------

    /// Sends `campaign` as JSON exactly as given; usually a `NewCampaign`.
    pub fn build_create_campaign<B: Serialize + ?Sized>(
        &self,
        session: &Session,
        campaign: &B,
    ) -> Result<HttpRequest, ApiError> {
        Ok(self.request(
            &route::CREATE_CAMPAIGN,
            Params {
                session: Some(session),
                body: Some(Body::json(campaign)?),
                ..Params::default()
            },
        ))
    }

    pub fn parse_create_campaign(&self, exchange: Exchange) -> Result<CampaignRecord, ApiError> {
        settle(&route::CREATE_CAMPAIGN, OnError::Propagate, exchange)
    }

    pub fn build_register_customer_data(
        &self,
        session: &Session,
        form: &MultipartForm,
    ) -> HttpRequest {
        self.request(
            &route::REGISTER_CUSTOMER_DATA,
            Params {
                session: Some(session),
                body: Some(Body::multipart(form)),
                ..Params::default()
            },
        )
    }

    pub fn parse_register_customer_data(
        &self,
        exchange: Exchange,
    ) -> Result<CampaignDetail, ApiError> {
        settle(&route::REGISTER_CUSTOMER_DATA, OnError::Propagate, exchange)
    }

    pub fn build_list_campaigns(&self, session: &Session) -> HttpRequest {
        self.request(
            &route::LIST_CAMPAIGNS,
            Params {
                session: Some(session),
                ..Params::default()
            },
        )
    }

    /// Soft-fails to an empty list.
    pub fn parse_list_campaigns(&self, exchange: Exchange) -> Vec<CampaignName> {
        settle(
            &route::LIST_CAMPAIGNS,
            OnError::DefaultValue(Vec::new()),
            exchange,
        )
        .unwrap_or_default()
    }

    pub fn build_list_campaign_stats(&self, session: &Session) -> HttpRequest {
        self.request(
            &route::LIST_CAMPAIGN_STATS,
            Params {
                session: Some(session),
                ..Params::default()
            },
        )
    }

    /// Soft-fails to an empty list.
    pub fn parse_list_campaign_stats(&self, exchange: Exchange) -> Vec<CampaignStats> {
        settle(
            &route::LIST_CAMPAIGN_STATS,
            OnError::DefaultValue(Vec::new()),
            exchange,
        )
        .unwrap_or_default()
    }

    pub fn build_list_customers(&self, session: &Session, campaign_id: i64) -> HttpRequest {
        self.request(
            &route::LIST_CUSTOMERS,
            Params {
                id: Some(campaign_id),
                session: Some(session),
                ..Params::default()
            },
        )
    }

    /// Soft-fails to an empty list.
    pub fn parse_list_customers(&self, exchange: Exchange) -> Vec<Customer> {
        settle(
            &route::LIST_CUSTOMERS,
            OnError::DefaultValue(Vec::new()),
            exchange,
        )
        .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Calls & metrics
    // -----------------------------------------------------------------------

    pub fn build_make_calls(&self, payload: &CallPayload) -> Result<HttpRequest, ApiError> {
        Ok(self.request(
            &route::MAKE_CALLS,
            Params {
                body: Some(Body::json(payload)?),
                ..Params::default()
            },
        ))
    }

    pub fn parse_make_calls(&self, exchange: Exchange) -> Result<Message, ApiError> {
        settle(&route::MAKE_CALLS, OnError::Propagate, exchange)
    }

    /// Bodyless trigger on the trailing-slash path.
    pub fn build_start_call(&self) -> HttpRequest {
        self.request(&route::START_CALL, Params::default())
    }

    pub fn parse_start_call(&self, exchange: Exchange) -> Result<Value, ApiError> {
        settle(&route::START_CALL, OnError::Propagate, exchange)
    }

    /// `month_year` is `YYYY-MM`; `None` sends no query string.
    pub fn build_agent_metrics(&self, month_year: Option<&str>) -> HttpRequest {
        self.request(
            &route::AGENT_METRICS,
            Params {
                query: month_year.map(|m| ("month_year", m)).into_iter().collect(),
                ..Params::default()
            },
        )
    }

    pub fn parse_agent_metrics(&self, exchange: Exchange) -> Result<AgentMetrics, ApiError> {
        settle(&route::AGENT_METRICS, OnError::Propagate, exchange)
    }

    pub fn build_list_agents(&self, session: &Session) -> HttpRequest {
        self.request(
            &route::LIST_AGENTS,
            Params {
                session: Some(session),
                ..Params::default()
            },
        )
    }

    pub fn parse_list_agents(&self, exchange: Exchange) -> Result<Vec<VoiceAgent>, ApiError> {
        settle(&route::LIST_AGENTS, OnError::Propagate, exchange)
    }

    // -----------------------------------------------------------------------
    // Leads
    // -----------------------------------------------------------------------

    pub fn build_lead_variables(&self) -> HttpRequest {
        self.request(&route::LEAD_VARIABLES, Params::default())
    }

    pub fn parse_lead_variables(&self, exchange: Exchange) -> Result<Value, ApiError> {
        settle(&route::LEAD_VARIABLES, OnError::Propagate, exchange)
    }

    pub fn build_fetch_leads(&self, campaign_id: i64) -> HttpRequest {
        self.request(
            &route::FETCH_LEADS,
            Params {
                id: Some(campaign_id),
                ..Params::default()
            },
        )
    }

    pub fn parse_fetch_leads(&self, exchange: Exchange) -> Result<Vec<LeadReport>, ApiError> {
        settle(&route::FETCH_LEADS, OnError::Propagate, exchange)
    }

    pub fn build_add_lead(&self, lead: &NewLead) -> Result<HttpRequest, ApiError> {
        Ok(self.request(
            &route::ADD_LEAD,
            Params {
                body: Some(Body::json(lead)?),
                ..Params::default()
            },
        ))
    }

    pub fn parse_add_lead(&self, exchange: Exchange) -> Result<Message, ApiError> {
        settle(&route::ADD_LEAD, OnError::Propagate, exchange)
    }

    pub fn build_delete_lead(&self, lead_id: i64) -> HttpRequest {
        self.request(
            &route::DELETE_LEAD,
            Params {
                id: Some(lead_id),
                ..Params::default()
            },
        )
    }

    pub fn parse_delete_lead(&self, exchange: Exchange) -> Result<Message, ApiError> {
        settle(&route::DELETE_LEAD, OnError::Propagate, exchange)
    }
}

/// Settle one exchange for `route` under `on_error`.
pub fn settle<T: DeserializeOwned>(
    route: &Route,
    on_error: OnError<T>,
    exchange: Exchange,
) -> Result<T, ApiError> {
    match (decode(route, exchange), on_error) {
        (Ok(value), _) => Ok(value),
        (Err(err), OnError::Propagate) => Err(err),
        (Err(err), OnError::DefaultValue(default)) => {
            tracing::warn!(path = route.path, error = %err, "{}", route.fallback);
            Ok(default)
        }
    }
}

fn decode<T: DeserializeOwned>(route: &Route, exchange: Exchange) -> Result<T, ApiError> {
    let response = match exchange {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(path = route.path, error = %err, "no response");
            return Err(ApiError::Rejected {
                status: None,
                payload: ErrorPayload::fallback(route.fallback),
            });
        }
    };

    if !response.is_success() {
        return Err(ApiError::Rejected {
            status: Some(response.status),
            payload: error_payload(route, &response.body),
        });
    }

    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// The server's JSON error body when it sent a usable one, else the route's
/// fallback.
fn error_payload(route: &Route, body: &str) -> ErrorPayload {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) | Err(_) => ErrorPayload::fallback(route.fallback),
        Ok(Value::String(s)) if s.is_empty() => ErrorPayload::fallback(route.fallback),
        Ok(value) => ErrorPayload::from_body(value),
    }
}
