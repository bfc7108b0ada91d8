//! Operation-keyed entry points for hosts that speak JSON instead of Rust
//! types.
//!
//! `build_operation` takes the operation's input as a JSON value plus an
//! optional scalar argument (path id, month, username) and routes to the
//! typed builder. `parse_value` settles any operation into a JSON value,
//! applying the route's own failure policy.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::client::{settle, CampaignClient, OnError};
use crate::error::ApiError;
use crate::form::MultipartForm;
use crate::http::{Exchange, HttpRequest};
use crate::route::{Failure, Operation};
use crate::session::Session;
use crate::types::{Attachment, CustomerUpload};

/// Inputs of a dynamically dispatched operation.
#[derive(Debug, Clone, Default)]
pub struct OperationInput {
    /// JSON payload for operations with a body.
    pub payload: Option<Value>,
    /// Path id, `month_year`, or username, depending on the operation.
    pub arg: Option<String>,
}

#[derive(Deserialize)]
struct LoginInput {
    username: String,
    password: String,
}

/// JSON shape of a customer upload; `agents` may be a list or a
/// comma-separated string.
#[derive(Deserialize)]
struct UploadInput {
    name: String,
    campaign_id: i64,
    company_id: i64,
    agents: AgentsInput,
    csv_filename: String,
    csv_content: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgentsInput {
    List(Vec<String>),
    Joined(String),
}

impl From<UploadInput> for CustomerUpload {
    fn from(input: UploadInput) -> Self {
        let agents = match input.agents {
            AgentsInput::List(list) => list,
            AgentsInput::Joined(joined) => joined.split(',').map(|a| a.trim().to_string()).collect(),
        };
        CustomerUpload {
            name: input.name,
            campaign_id: input.campaign_id,
            company_id: input.company_id,
            agents,
            csv_file: Attachment::csv(input.csv_filename, input.csv_content),
        }
    }
}

impl OperationInput {
    fn payload<T: DeserializeOwned>(&self, op: Operation) -> Result<T, ApiError> {
        let payload = self
            .payload
            .clone()
            .ok_or_else(|| ApiError::InvalidInput(format!("{op:?} requires a payload")))?;
        serde_json::from_value(payload)
            .map_err(|e| ApiError::InvalidInput(format!("{op:?} payload: {e}")))
    }

    fn raw_payload(&self, op: Operation) -> Result<&Value, ApiError> {
        self.payload
            .as_ref()
            .ok_or_else(|| ApiError::InvalidInput(format!("{op:?} requires a payload")))
    }

    fn arg(&self, op: Operation) -> Result<&str, ApiError> {
        self.arg
            .as_deref()
            .ok_or_else(|| ApiError::InvalidInput(format!("{op:?} requires an argument")))
    }

    fn id(&self, op: Operation) -> Result<i64, ApiError> {
        let arg = self.arg(op)?;
        arg.trim()
            .parse()
            .map_err(|_| ApiError::InvalidInput(format!("{op:?}: {arg:?} is not an id")))
    }
}

impl CampaignClient {
    /// Build the request for `op` from JSON input.
    pub fn build_operation(
        &self,
        op: Operation,
        session: &Session,
        input: &OperationInput,
    ) -> Result<HttpRequest, ApiError> {
        match op {
            Operation::RegisterCompany => self.build_register_company(&input.payload(op)?),
            Operation::Login => {
                let login: LoginInput = input.payload(op)?;
                Ok(self.build_login(&login.username, &login.password))
            }
            Operation::ChangePassword => {
                self.build_change_password(session, &input.payload(op)?)
            }
            Operation::ForgotPassword => Ok(self.build_forgot_password(input.arg(op)?)),
            Operation::VerifyOtp => self.build_verify_otp(&input.payload(op)?),
            Operation::ResetPassword => self.build_reset_password(&input.payload(op)?),
            Operation::CreateCampaign => {
                self.build_create_campaign(session, input.raw_payload(op)?)
            }
            Operation::RegisterCustomerData => {
                let upload: UploadInput = input.payload(op)?;
                let form = MultipartForm::from(&CustomerUpload::from(upload));
                Ok(self.build_register_customer_data(session, &form))
            }
            Operation::MakeCalls => self.build_make_calls(&input.payload(op)?),
            Operation::StartCall => Ok(self.build_start_call()),
            Operation::ListCampaigns => Ok(self.build_list_campaigns(session)),
            Operation::ListCampaignStats => Ok(self.build_list_campaign_stats(session)),
            Operation::ListCustomers => Ok(self.build_list_customers(session, input.id(op)?)),
            Operation::AgentMetrics => Ok(self.build_agent_metrics(input.arg.as_deref())),
            Operation::LeadVariables => Ok(self.build_lead_variables()),
            Operation::FetchLeads => Ok(self.build_fetch_leads(input.id(op)?)),
            Operation::AddLead => self.build_add_lead(&input.payload(op)?),
            Operation::DeleteLead => Ok(self.build_delete_lead(input.id(op)?)),
            Operation::ListAgents => Ok(self.build_list_agents(session)),
        }
    }

    /// Settle `exchange` for `op` as untyped JSON. Soft-fail routes yield `[]`.
    pub fn parse_value(&self, op: Operation, exchange: Exchange) -> Result<Value, ApiError> {
        let route = op.route();
        let on_error = match route.failure {
            Failure::Propagate => OnError::Propagate,
            Failure::Empty => OnError::DefaultValue(Value::Array(Vec::new())),
        };
        settle(route, on_error, exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpResponse;
    use crate::route::Auth;
    use serde_json::json;

    fn client() -> CampaignClient {
        CampaignClient::new("http://localhost:3000")
    }

    /// A valid input for every operation.
    fn sample_input(op: Operation) -> OperationInput {
        let (payload, arg) = match op {
            Operation::RegisterCompany => (
                Some(json!({"name":"A","username":"a","email":"a@a.a","phone":"1","password":"p"})),
                None,
            ),
            Operation::Login => (Some(json!({"username":"a","password":"p"})), None),
            Operation::ChangePassword => (
                Some(json!({"username":"a","old_password":"p","new_password":"q"})),
                None,
            ),
            Operation::ForgotPassword => (None, Some("a")),
            Operation::VerifyOtp => (Some(json!({"otp":"123456"})), None),
            Operation::ResetPassword => (Some(json!({"username":"a","new_password":"q"})), None),
            Operation::CreateCampaign => (Some(json!({"name":"c","email":"c@c.c"})), None),
            Operation::RegisterCustomerData => (
                Some(json!({
                    "name":"c","campaign_id":1,"company_id":1,"agents":"x, y",
                    "csv_filename":"c.csv","csv_content":"name,phone\n"
                })),
                None,
            ),
            Operation::MakeCalls => (Some(json!({"id":1,"type":"agent"})), None),
            Operation::ListCustomers | Operation::FetchLeads | Operation::DeleteLead => {
                (None, Some("12"))
            }
            Operation::AddLead => (Some(json!({"number":"555"})), None),
            Operation::StartCall
            | Operation::ListCampaigns
            | Operation::ListCampaignStats
            | Operation::AgentMetrics
            | Operation::LeadVariables
            | Operation::ListAgents => (None, None),
        };
        OperationInput {
            payload,
            arg: arg.map(str::to_string),
        }
    }

    #[test]
    fn every_operation_builds_against_its_route() {
        let c = client();
        for op in Operation::ALL {
            let req = c
                .build_operation(op, &Session::bearer("T"), &sample_input(op))
                .unwrap();
            let route = op.route();
            assert_eq!(req.method, route.method, "{op:?}");
            let path = route.path.replace("{id}", "12");
            assert!(
                req.url.starts_with(&format!("http://localhost:3000{path}")),
                "{op:?}: {}",
                req.url
            );
        }
    }

    #[test]
    fn bearer_attached_exactly_once_on_authenticated_routes_only() {
        let c = client();
        for op in Operation::ALL {
            let req = c
                .build_operation(op, &Session::bearer("T"), &sample_input(op))
                .unwrap();
            match op.route().auth {
                Auth::Bearer => {
                    assert_eq!(req.header_count("authorization"), 1, "{op:?}");
                    assert_eq!(req.header("authorization"), Some("Bearer T"), "{op:?}");
                }
                Auth::None => assert_eq!(req.header_count("authorization"), 0, "{op:?}"),
            }
        }
    }

    #[test]
    fn every_propagating_operation_falls_back_on_transport_failure() {
        let c = client();
        for op in Operation::ALL {
            let route = op.route();
            let result = c.parse_value(op, Err(TransportError("down".to_string())));
            match route.failure {
                Failure::Propagate => {
                    let err = result.unwrap_err();
                    assert_eq!(
                        err.payload().unwrap().as_value(),
                        &json!({ "detail": route.fallback }),
                        "{op:?}"
                    );
                }
                Failure::Empty => assert_eq!(result.unwrap(), json!([]), "{op:?}"),
            }
        }
    }

    #[test]
    fn every_propagating_operation_passes_structured_body_through() {
        let c = client();
        let body = json!({"detail": "nope", "code": 7});
        for op in Operation::ALL {
            let response = HttpResponse::new(400, body.to_string());
            let result = c.parse_value(op, Ok(response));
            match op.route().failure {
                Failure::Propagate => {
                    let err = result.unwrap_err();
                    assert_eq!(err.payload().unwrap().as_value(), &body, "{op:?}");
                    assert_eq!(err.status(), Some(400));
                }
                Failure::Empty => assert_eq!(result.unwrap(), json!([]), "{op:?}"),
            }
        }
    }

    #[test]
    fn agents_accept_list_or_joined_string() {
        let c = client();
        let mut input = sample_input(Operation::RegisterCustomerData);
        let req = c
            .build_operation(Operation::RegisterCustomerData, &Session::anonymous(), &input)
            .unwrap();
        assert!(req.body_text().unwrap().contains("\r\n\r\nx,y\r\n"));

        input.payload.as_mut().unwrap()["agents"] = json!(["p", "q"]);
        let req = c
            .build_operation(Operation::RegisterCustomerData, &Session::anonymous(), &input)
            .unwrap();
        assert!(req.body_text().unwrap().contains("\r\n\r\np,q\r\n"));
    }

    #[test]
    fn missing_or_bad_input_is_rejected() {
        let c = client();
        let err = c
            .build_operation(Operation::Login, &Session::anonymous(), &OperationInput::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let input = OperationInput {
            payload: None,
            arg: Some("abc".to_string()),
        };
        let err = c
            .build_operation(Operation::DeleteLead, &Session::anonymous(), &input)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn create_campaign_payload_is_forwarded_verbatim() {
        let payload = json!({"name": "c", "whatever": {"deep": [1]}});
        let input = OperationInput {
            payload: Some(payload.clone()),
            arg: None,
        };
        let req = client()
            .build_operation(Operation::CreateCampaign, &Session::bearer("T"), &input)
            .unwrap();
        let sent: Value = serde_json::from_str(req.body_text().unwrap()).unwrap();
        assert_eq!(sent, payload);
    }
}
