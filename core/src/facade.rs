//! One-call API over `CampaignClient` + a `Transport`.
//!
//! Each method builds the request, sends it once and settles the outcome.
//! There are no retries: a transport failure is settled like any other
//! failure of that operation.

use serde::Serialize;
use serde_json::Value;

use crate::client::CampaignClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, StoreError};
use crate::form::MultipartForm;
use crate::http::HttpRequest;
use crate::session::{Session, TokenStore, TOKEN_KEY};
use crate::transport::Transport;
use crate::types::{
    AgentMetrics, CallPayload, CampaignDetail, CampaignName, CampaignRecord, CampaignStats,
    ChangePassword, Company, Customer, ForgotPasswordResponse, LeadReport, LoginResponse, Message,
    NewLead, RegisterCompany, ResetPassword, VerifyOtp, VoiceAgent,
};

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Facade<T> {
    client: CampaignClient,
    transport: T,
}

impl<T: Transport> Facade<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: CampaignClient::new(&config.base_url),
            transport,
        }
    }

    pub fn client(&self) -> &CampaignClient {
        &self.client
    }

    fn exchange(&self, request: &HttpRequest) -> crate::http::Exchange {
        self.transport.send(request)
    }

    pub fn register_company(&self, input: &RegisterCompany) -> Result<Company, ApiError> {
        let request = self.client.build_register_company(input)?;
        self.client.parse_register_company(self.exchange(&request))
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = self.client.build_login(username, password);
        self.client.parse_login(self.exchange(&request))
    }

    /// Log in and persist the access token under `TOKEN_KEY`.
    pub fn sign_in(
        &self,
        store: &dyn TokenStore,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, SignInError> {
        let login = self.login(username, password)?;
        store.set(TOKEN_KEY, &login.access_token)?;
        tracing::info!(username, "signed in");
        Ok(login)
    }

    /// Forget the stored token. No request is made.
    pub fn sign_out(&self, store: &dyn TokenStore) -> Result<(), StoreError> {
        store.remove(TOKEN_KEY)
    }

    pub fn change_password(
        &self,
        session: &Session,
        input: &ChangePassword,
    ) -> Result<Message, ApiError> {
        let request = self.client.build_change_password(session, input)?;
        self.client.parse_change_password(self.exchange(&request))
    }

    pub fn forgot_password(&self, username: &str) -> Result<ForgotPasswordResponse, ApiError> {
        let request = self.client.build_forgot_password(username);
        self.client.parse_forgot_password(self.exchange(&request))
    }

    pub fn verify_otp(&self, input: &VerifyOtp) -> Result<Message, ApiError> {
        let request = self.client.build_verify_otp(input)?;
        self.client.parse_verify_otp(self.exchange(&request))
    }

    pub fn reset_password(&self, input: &ResetPassword) -> Result<Message, ApiError> {
        let request = self.client.build_reset_password(input)?;
        self.client.parse_reset_password(self.exchange(&request))
    }

    pub fn create_campaign<B: Serialize + ?Sized>(
        &self,
        session: &Session,
        campaign: &B,
    ) -> Result<CampaignRecord, ApiError> {
        let request = self.client.build_create_campaign(session, campaign)?;
        self.client.parse_create_campaign(self.exchange(&request))
    }

    pub fn register_customer_data(
        &self,
        session: &Session,
        form: &MultipartForm,
    ) -> Result<CampaignDetail, ApiError> {
        let request = self.client.build_register_customer_data(session, form);
        self.client.parse_register_customer_data(self.exchange(&request))
    }

    pub fn make_calls(&self, payload: &CallPayload) -> Result<Message, ApiError> {
        let request = self.client.build_make_calls(payload)?;
        self.client.parse_make_calls(self.exchange(&request))
    }

    pub fn start_call(&self) -> Result<Value, ApiError> {
        let request = self.client.build_start_call();
        self.client.parse_start_call(self.exchange(&request))
    }

    pub fn list_campaigns(&self, session: &Session) -> Vec<CampaignName> {
        let request = self.client.build_list_campaigns(session);
        self.client.parse_list_campaigns(self.exchange(&request))
    }

    pub fn list_campaign_stats(&self, session: &Session) -> Vec<CampaignStats> {
        let request = self.client.build_list_campaign_stats(session);
        self.client.parse_list_campaign_stats(self.exchange(&request))
    }

    pub fn list_customers(&self, session: &Session, campaign_id: i64) -> Vec<Customer> {
        let request = self.client.build_list_customers(session, campaign_id);
        self.client.parse_list_customers(self.exchange(&request))
    }

    pub fn agent_metrics(&self, month_year: Option<&str>) -> Result<AgentMetrics, ApiError> {
        let request = self.client.build_agent_metrics(month_year);
        self.client.parse_agent_metrics(self.exchange(&request))
    }

    pub fn list_agents(&self, session: &Session) -> Result<Vec<VoiceAgent>, ApiError> {
        let request = self.client.build_list_agents(session);
        self.client.parse_list_agents(self.exchange(&request))
    }

    pub fn lead_variables(&self) -> Result<Value, ApiError> {
        let request = self.client.build_lead_variables();
        self.client.parse_lead_variables(self.exchange(&request))
    }

    pub fn fetch_leads(&self, campaign_id: i64) -> Result<Vec<LeadReport>, ApiError> {
        let request = self.client.build_fetch_leads(campaign_id);
        self.client.parse_fetch_leads(self.exchange(&request))
    }

    pub fn add_lead(&self, lead: &NewLead) -> Result<Message, ApiError> {
        let request = self.client.build_add_lead(lead)?;
        self.client.parse_add_lead(self.exchange(&request))
    }

    pub fn delete_lead(&self, lead_id: i64) -> Result<Message, ApiError> {
        let request = self.client.build_delete_lead(lead_id);
        self.client.parse_delete_lead(self.exchange(&request))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpResponse;
    use crate::session::MemoryStore;
    use crate::types::NewCampaign;

    /// Records requests and replays scripted outcomes in order.
    #[derive(Default)]
    struct Scripted {
        sent: RefCell<Vec<HttpRequest>>,
        replies: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    }

    impl Scripted {
        fn reply(self, status: u16, body: &str) -> Self {
            self.replies
                .borrow_mut()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        fn fail(self) -> Self {
            self.replies
                .borrow_mut()
                .push_back(Err(TransportError("reset by peer".to_string())));
            self
        }
    }

    impl Transport for Scripted {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no scripted reply".to_string())))
        }
    }

    fn facade(transport: &Scripted) -> Facade<&Scripted> {
        Facade::new(
            &ClientConfig {
                base_url: "http://api.test".to_string(),
            },
            transport,
        )
    }

    #[test]
    fn sign_in_stores_token_used_by_later_calls() {
        let transport = Scripted::default()
            .reply(200, r#"{"access_token":"T1","token_type":"bearer"}"#)
            .reply(200, r#"{"id":5,"name":"Spring","status":"Paused"}"#);
        let store = MemoryStore::new();
        let api = facade(&transport);

        api.sign_in(&store, "acme", "pw").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));

        let session = Session::from_store(&store).unwrap();
        let campaign = NewCampaign {
            name: "Spring".to_string(),
            email: "a@b.c".to_string(),
            status: "Paused".to_string(),
        };
        let created = api.create_campaign(&session, &campaign).unwrap();
        assert_eq!(created.id, 5);

        let sent = transport.sent.borrow();
        assert_eq!(sent[0].body_text(), Some("username=acme&password=pw"));
        assert_eq!(sent[0].header_count("authorization"), 0);
        assert_eq!(sent[1].header("authorization"), Some("Bearer T1"));
        assert_eq!(sent[1].header_count("authorization"), 1);
    }

    #[test]
    fn failed_sign_in_leaves_store_untouched() {
        let transport = Scripted::default().reply(401, r#"{"detail":"Invalid credentials"}"#);
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "old").unwrap();

        let err = facade(&transport).sign_in(&store, "acme", "bad").unwrap_err();
        assert!(matches!(err, SignInError::Api(_)));
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn sign_out_removes_token_without_request() {
        let transport = Scripted::default();
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "T").unwrap();
        facade(&transport).sign_out(&store).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn exactly_one_attempt_per_call() {
        let transport = Scripted::default().fail().reply(200, r#"{"message":"ok"}"#);
        let api = facade(&transport);
        let err = api.make_calls(&CallPayload {
            id: 1,
            target: crate::types::CallTarget::Campaign,
        });
        assert_eq!(err.unwrap_err().detail(), Some("Make call failed"));
        assert_eq!(transport.sent.borrow().len(), 1);
    }

    #[test]
    fn listing_hides_failures() {
        let transport = Scripted::default().fail();
        let customers = facade(&transport).list_customers(&Session::bearer("T"), 3);
        assert!(customers.is_empty());
        assert_eq!(
            transport.sent.borrow()[0].url,
            "http://api.test/campaigns/3/customers"
        );
    }
}
