//! Route table for every remote operation.
//!
//! A `Route` names the method, path template, auth requirement, body
//! encoding and failure behavior of one endpoint. `CampaignClient` never
//! hardcodes any of these; it reads them from here.

use crate::http::HttpMethod;

/// Whether the route needs `authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    None,
    Bearer,
}

/// How the request body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// No body, no content-type.
    Empty,
    Json,
    Form,
    Multipart,
}

impl Encoding {
    /// Content type for encodings with a fixed one. Multipart carries its
    /// boundary, so it is produced by the form encoder instead.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Encoding::Empty | Encoding::Multipart => None,
            Encoding::Json => Some("application/json"),
            Encoding::Form => Some("application/x-www-form-urlencoded"),
        }
    }
}

/// What the route does by default when the call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Raise `ApiError::Rejected`.
    Propagate,
    /// Log and hand back an empty collection.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    /// Path relative to the base endpoint; `{id}` is substituted.
    pub path: &'static str,
    pub auth: Auth,
    pub encoding: Encoding,
    pub failure: Failure,
    /// `detail` of the fallback error payload, and the soft-fail log message.
    pub fallback: &'static str,
}

impl Route {
    /// Whether the path has an `{id}` placeholder.
    pub fn has_param(&self) -> bool {
        self.path.contains("{id}")
    }
}

const fn route(
    method: HttpMethod,
    path: &'static str,
    auth: Auth,
    encoding: Encoding,
    failure: Failure,
    fallback: &'static str,
) -> Route {
    Route {
        method,
        path,
        auth,
        encoding,
        failure,
        fallback,
    }
}

use Auth::{Bearer, None as Public};
use Encoding::{Empty, Form, Json, Multipart};
use Failure::{Empty as SoftFail, Propagate};
use HttpMethod::{Get, Post};

pub const REGISTER_COMPANY: Route =
    route(Post, "/companies/", Public, Json, Propagate, "Registration failed");
pub const LOGIN: Route = route(Post, "/auth/login", Public, Form, Propagate, "Login failed");
pub const CHANGE_PASSWORD: Route = route(
    Post,
    "/auth/change-password",
    Bearer,
    Json,
    Propagate,
    "Change password failed",
);
pub const FORGOT_PASSWORD: Route = route(
    Post,
    "/auth/forgot-password",
    Public,
    Empty,
    Propagate,
    "Forgot password failed",
);
pub const VERIFY_OTP: Route = route(
    Post,
    "/auth/verify-otp",
    Public,
    Json,
    Propagate,
    "OTP verification failed",
);
pub const RESET_PASSWORD: Route = route(
    Post,
    "/auth/reset-password",
    Public,
    Json,
    Propagate,
    "Password reset failed",
);
pub const CREATE_CAMPAIGN: Route = route(
    Post,
    "/campaigns/new_campaigns",
    Bearer,
    Json,
    Propagate,
    "Failed to create campaign",
);
pub const REGISTER_CUSTOMER_DATA: Route = route(
    Post,
    "/campaigns/",
    Bearer,
    Multipart,
    Propagate,
    "Form submission failed",
);
pub const MAKE_CALLS: Route = route(Post, "/make_call", Public, Json, Propagate, "Make call failed");
pub const START_CALL: Route =
    route(Post, "/make_call/", Public, Empty, Propagate, "Start call failed");
pub const LIST_CAMPAIGNS: Route = route(
    Get,
    "/campaigns/get",
    Bearer,
    Empty,
    SoftFail,
    "Error fetching campaigns",
);
pub const LIST_CAMPAIGN_STATS: Route = route(
    Get,
    "/campaigns/get_campaign",
    Bearer,
    Empty,
    SoftFail,
    "Error fetching campaigns",
);
pub const LIST_CUSTOMERS: Route = route(
    Get,
    "/campaigns/{id}/customers",
    Bearer,
    Empty,
    SoftFail,
    "Error fetching customers",
);
pub const AGENT_METRICS: Route = route(
    Get,
    "/agent-metrics/",
    Public,
    Empty,
    Propagate,
    "Agent metrics failed",
);
pub const LEAD_VARIABLES: Route = route(
    Get,
    "/api/leadrat/variables/",
    Public,
    Empty,
    Propagate,
    "Fetch variables failed",
);
pub const FETCH_LEADS: Route = route(
    Get,
    "/api/get_data/{id}",
    Public,
    Empty,
    Propagate,
    "Fetch data failed",
);
pub const ADD_LEAD: Route = route(Post, "/api/add_data/", Public, Json, Propagate, "Add data failed");
// The server deletes on GET.
pub const DELETE_LEAD: Route =
    route(Get, "/leads/{id}/", Public, Empty, Propagate, "Delete lead failed");
pub const LIST_AGENTS: Route = route(
    Get,
    "/agents/",
    Bearer,
    Empty,
    Propagate,
    "Failed to fetch agents",
);

/// Every remote operation the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterCompany,
    Login,
    ChangePassword,
    ForgotPassword,
    VerifyOtp,
    ResetPassword,
    CreateCampaign,
    RegisterCustomerData,
    MakeCalls,
    StartCall,
    ListCampaigns,
    ListCampaignStats,
    ListCustomers,
    AgentMetrics,
    LeadVariables,
    FetchLeads,
    AddLead,
    DeleteLead,
    ListAgents,
}

impl Operation {
    pub const ALL: [Operation; 19] = [
        Operation::RegisterCompany,
        Operation::Login,
        Operation::ChangePassword,
        Operation::ForgotPassword,
        Operation::VerifyOtp,
        Operation::ResetPassword,
        Operation::CreateCampaign,
        Operation::RegisterCustomerData,
        Operation::MakeCalls,
        Operation::StartCall,
        Operation::ListCampaigns,
        Operation::ListCampaignStats,
        Operation::ListCustomers,
        Operation::AgentMetrics,
        Operation::LeadVariables,
        Operation::FetchLeads,
        Operation::AddLead,
        Operation::DeleteLead,
        Operation::ListAgents,
    ];

    pub fn route(&self) -> &'static Route {
        match self {
            Operation::RegisterCompany => &REGISTER_COMPANY,
            Operation::Login => &LOGIN,
            Operation::ChangePassword => &CHANGE_PASSWORD,
            Operation::ForgotPassword => &FORGOT_PASSWORD,
            Operation::VerifyOtp => &VERIFY_OTP,
            Operation::ResetPassword => &RESET_PASSWORD,
            Operation::CreateCampaign => &CREATE_CAMPAIGN,
            Operation::RegisterCustomerData => &REGISTER_CUSTOMER_DATA,
            Operation::MakeCalls => &MAKE_CALLS,
            Operation::StartCall => &START_CALL,
            Operation::ListCampaigns => &LIST_CAMPAIGNS,
            Operation::ListCampaignStats => &LIST_CAMPAIGN_STATS,
            Operation::ListCustomers => &LIST_CUSTOMERS,
            Operation::AgentMetrics => &AGENT_METRICS,
            Operation::LeadVariables => &LEAD_VARIABLES,
            Operation::FetchLeads => &FETCH_LEADS,
            Operation::AddLead => &ADD_LEAD,
            Operation::DeleteLead => &DELETE_LEAD,
            Operation::ListAgents => &LIST_AGENTS,
        }
    }

    /// Stable snake_case name, used in logs and by JSON-speaking hosts.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RegisterCompany => "register_company",
            Operation::Login => "login",
            Operation::ChangePassword => "change_password",
            Operation::ForgotPassword => "forgot_password",
            Operation::VerifyOtp => "verify_otp",
            Operation::ResetPassword => "reset_password",
            Operation::CreateCampaign => "create_campaign",
            Operation::RegisterCustomerData => "register_customer_data",
            Operation::MakeCalls => "make_calls",
            Operation::StartCall => "start_call",
            Operation::ListCampaigns => "list_campaigns",
            Operation::ListCampaignStats => "list_campaign_stats",
            Operation::ListCustomers => "list_customers",
            Operation::AgentMetrics => "agent_metrics",
            Operation::LeadVariables => "lead_variables",
            Operation::FetchLeads => "fetch_leads",
            Operation::AddLead => "add_lead",
            Operation::DeleteLead => "delete_lead",
            Operation::ListAgents => "list_agents",
        }
    }

    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| op.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_fail_is_limited_to_the_three_listings() {
        let soft: Vec<Operation> = Operation::ALL
            .into_iter()
            .filter(|op| op.route().failure == Failure::Empty)
            .collect();
        assert_eq!(
            soft,
            vec![
                Operation::ListCampaigns,
                Operation::ListCampaignStats,
                Operation::ListCustomers
            ]
        );
    }

    #[test]
    fn user_facing_fallback_literals_are_stable() {
        assert_eq!(REGISTER_COMPANY.fallback, "Registration failed");
        assert_eq!(LOGIN.fallback, "Login failed");
        assert_eq!(CREATE_CAMPAIGN.fallback, "Failed to create campaign");
        assert_eq!(REGISTER_CUSTOMER_DATA.fallback, "Form submission failed");
    }

    #[test]
    fn only_bodyless_routes_use_get() {
        for op in Operation::ALL {
            let route = op.route();
            if route.method == HttpMethod::Get {
                assert_eq!(route.encoding, Encoding::Empty, "{op:?}");
            }
        }
    }

    #[test]
    fn param_routes() {
        let with_param: Vec<Operation> = Operation::ALL
            .into_iter()
            .filter(|op| op.route().has_param())
            .collect();
        assert_eq!(
            with_param,
            vec![
                Operation::ListCustomers,
                Operation::FetchLeads,
                Operation::DeleteLead
            ]
        );
    }

    #[test]
    fn names_round_trip_and_are_unique() {
        let mut names: Vec<&str> = Operation::ALL.iter().map(Operation::name).collect();
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Operation::ALL.len());
        assert_eq!(Operation::from_name("drop_tables"), None);
    }
}
