//! C-ABI wrapper around `campaign-core`.
//!
//! # Overview
//! Exposes every campaign API operation through a handful of `extern "C"`
//! functions so a host UI written in any language with a C FFI can build
//! requests, perform the I/O itself, and settle the responses.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Operations are selected with `FfiOperation`; inputs and outputs are JSON
//!   text, so one build and one parse function cover the whole API.
//! - `FfiCampaignResult` carries an error code, the HTTP status and either
//!   the success payload or the error payload.
//! - The C caller owns all returned pointers and must call the matching
//!   `campaign_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use campaign_core::{HttpResponse, OperationInput, Session, TransportError};

use types::*;

/// Borrow a nullable C string. Null and non-UTF-8 both read as `None`.
fn opt_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `CampaignClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `campaign_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn campaign_client_new(base_url: *const c_char) -> *mut FfiCampaignClient {
    catch_unwind(|| {
        let Some(url) = opt_str(base_url) else {
            return std::ptr::null_mut();
        };
        let client = campaign_core::CampaignClient::new(url);
        Box::into_raw(Box::new(FfiCampaignClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `campaign_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn campaign_client_free(client: *mut FfiCampaignClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the HTTP request for `operation`.
///
/// - `token`: session token, or null when signed out (sent as `Bearer null`
///   on authenticated routes).
/// - `payload_json`: the operation's JSON input, or null if it takes none.
/// - `arg`: campaign id, lead id, `month_year` or username, or null.
///
/// Returns null if `client` is null, `payload_json` is not JSON, or the
/// input does not fit the operation.
/// The caller must free the returned pointer with `campaign_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn campaign_build_request(
    client: *const FfiCampaignClient,
    operation: FfiOperation,
    token: *const c_char,
    payload_json: *const c_char,
    arg: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let session = match opt_str(token) {
            Some(token) => Session::bearer(token),
            None => Session::anonymous(),
        };
        let parsed = opt_str(payload_json).map(serde_json::from_str::<serde_json::Value>);
        let payload = match parsed {
            Some(Ok(value)) => Some(value),
            Some(Err(_)) => return std::ptr::null_mut(),
            None => None,
        };
        let input = OperationInput {
            payload,
            arg: opt_str(arg).map(str::to_string),
        };
        match client.inner.build_operation(operation.into(), &session, &input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the form-encoded login request.
///
/// Returns null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn campaign_build_login(
    client: *const FfiCampaignClient,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let (Some(username), Some(password)) = (opt_str(username), opt_str(password)) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_login(username, password))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Settle the outcome of an `operation` request.
///
/// Listing operations never fail: any failure yields `Ok` with `[]`.
#[unsafe(no_mangle)]
pub extern "C" fn campaign_parse_response(
    client: *const FfiCampaignClient,
    operation: FfiOperation,
    response: *const FfiHttpResponse,
) -> *mut FfiCampaignResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCampaignResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCampaignResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let (status, exchange) = if resp.transport_failed {
            (0, Err(TransportError("reported by host".to_string())))
        } else {
            let body = opt_str(resp.body).unwrap_or("");
            (resp.status, Ok(HttpResponse::new(resp.status, body)))
        };
        match client.inner.parse_value(operation.into(), exchange) {
            Ok(value) => FfiCampaignResult::ok(status, &value),
            Err(e) => FfiCampaignResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCampaignResult::panic("panic in campaign_parse_response"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `campaign_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn campaign_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.body, req.body_len))
            });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiCampaignResult` returned by `campaign_parse_response`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn campaign_free_result(result: *mut FfiCampaignResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_json.is_null() {
            drop(unsafe { CString::from_raw(result.error_json) });
        }
        if !result.data_json.is_null() {
            drop(unsafe { CString::from_raw(result.data_json) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn campaign_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn new_client() -> *mut FfiCampaignClient {
        let url = CString::new("http://localhost:3000").unwrap();
        campaign_client_new(url.as_ptr())
    }

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    fn url_of(req: &FfiHttpRequest) -> String {
        unsafe { CStr::from_ptr(req.url) }.to_str().unwrap().to_string()
    }

    fn headers_of(req: &FfiHttpRequest) -> Vec<(String, String)> {
        if req.headers.is_null() {
            return Vec::new();
        }
        let headers = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
        headers
            .iter()
            .map(|h| unsafe {
                (
                    CStr::from_ptr(h.key).to_str().unwrap().to_string(),
                    CStr::from_ptr(h.value).to_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    fn body_of(req: &FfiHttpRequest) -> Option<Vec<u8>> {
        if req.body.is_null() {
            return None;
        }
        Some(unsafe { std::slice::from_raw_parts(req.body, req.body_len) }.to_vec())
    }

    fn json_of(s: *mut c_char) -> Value {
        assert!(!s.is_null());
        serde_json::from_str(unsafe { CStr::from_ptr(s) }.to_str().unwrap()).unwrap()
    }

    fn parse(op: FfiOperation, status: u16, body: &str) -> *mut FfiCampaignResult {
        let client = new_client();
        let body = c(body);
        let resp = FfiHttpResponse {
            status,
            body: body.as_ptr(),
            transport_failed: false,
        };
        let result = campaign_parse_response(client, op, &resp);
        campaign_client_free(client);
        result
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        assert!(!client.is_null());
        campaign_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        let client = campaign_client_new(std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        campaign_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_list_campaigns_carries_bearer() {
        let client = new_client();
        let token = c("T");
        let req = campaign_build_request(
            client,
            FfiOperation::ListCampaigns,
            token.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
        );
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Get);
        assert_eq!(url_of(req_ref), "http://localhost:3000/campaigns/get");
        assert_eq!(
            headers_of(req_ref),
            vec![("authorization".to_string(), "Bearer T".to_string())]
        );
        assert!(body_of(req_ref).is_none());

        campaign_free_request(req);
        campaign_client_free(client);
    }

    #[test]
    fn build_without_token_sends_placeholder() {
        let client = new_client();
        let req = campaign_build_request(
            client,
            FfiOperation::ListAgents,
            std::ptr::null(),
            std::ptr::null(),
            std::ptr::null(),
        );
        let req_ref = unsafe { &*req };
        assert_eq!(url_of(req_ref), "http://localhost:3000/agents/");
        assert_eq!(headers_of(req_ref)[0].1, "Bearer null");

        campaign_free_request(req);
        campaign_client_free(client);
    }

    #[test]
    fn build_create_campaign_forwards_payload() {
        let client = new_client();
        let token = c("T");
        let payload = c(r#"{"name":"Spring","email":"ops@acme.test","extra":[1]}"#);
        let req = campaign_build_request(
            client,
            FfiOperation::CreateCampaign,
            token.as_ptr(),
            payload.as_ptr(),
            std::ptr::null(),
        );
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Post);
        assert_eq!(req_ref.headers_len, 2);
        let body: Value = serde_json::from_slice(&body_of(req_ref).unwrap()).unwrap();
        assert_eq!(body, json!({"name":"Spring","email":"ops@acme.test","extra":[1]}));

        campaign_free_request(req);
        campaign_client_free(client);
    }

    #[test]
    fn build_uses_arg_for_path_ids() {
        let client = new_client();
        let id = c("42");
        let req = campaign_build_request(
            client,
            FfiOperation::DeleteLead,
            std::ptr::null(),
            std::ptr::null(),
            id.as_ptr(),
        );
        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Get);
        assert_eq!(url_of(req_ref), "http://localhost:3000/leads/42/");

        campaign_free_request(req);
        campaign_client_free(client);
    }

    #[test]
    fn build_upload_is_multipart_bytes() {
        let client = new_client();
        let token = c("T");
        let payload = c(&json!({
            "name": "Spring callers",
            "campaign_id": 3,
            "company_id": 1,
            "agents": ["Ada", "Grace"],
            "csv_filename": "leads.csv",
            "csv_content": "name,phone\nAnn,555\n",
        })
        .to_string());
        let req = campaign_build_request(
            client,
            FfiOperation::RegisterCustomerData,
            token.as_ptr(),
            payload.as_ptr(),
            std::ptr::null(),
        );
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        let content_type = headers_of(req_ref)
            .into_iter()
            .find(|(k, _)| k == "content-type")
            .unwrap()
            .1;
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = String::from_utf8(body_of(req_ref).unwrap()).unwrap();
        assert!(body.contains("filename=\"leads.csv\""));
        assert!(body.contains("Ada,Grace"));

        campaign_free_request(req);
        campaign_client_free(client);
    }

    #[test]
    fn build_rejects_bad_input() {
        let client = new_client();
        let not_json = c("{nope");
        let req = campaign_build_request(
            client,
            FfiOperation::AddLead,
            std::ptr::null(),
            not_json.as_ptr(),
            std::ptr::null(),
        );
        assert!(req.is_null());

        let not_an_id = c("abc");
        let req = campaign_build_request(
            client,
            FfiOperation::FetchLeads,
            std::ptr::null(),
            std::ptr::null(),
            not_an_id.as_ptr(),
        );
        assert!(req.is_null());

        let req = campaign_build_request(
            client,
            FfiOperation::Login,
            std::ptr::null(),
            std::ptr::null(),
            std::ptr::null(),
        );
        assert!(req.is_null());
        campaign_client_free(client);
    }

    #[test]
    fn build_null_client_returns_null() {
        let req = campaign_build_request(
            std::ptr::null(),
            FfiOperation::StartCall,
            std::ptr::null(),
            std::ptr::null(),
            std::ptr::null(),
        );
        assert!(req.is_null());
    }

    #[test]
    fn build_login_is_form_encoded() {
        let client = new_client();
        let (user, pass) = (c("u"), c("p"));
        let req = campaign_build_login(client, user.as_ptr(), pass.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Post);
        assert_eq!(url_of(req_ref), "http://localhost:3000/auth/login");
        assert_eq!(body_of(req_ref).unwrap(), b"username=u&password=p");
        assert_eq!(
            headers_of(req_ref),
            vec![(
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string()
            )]
        );

        campaign_free_request(req);
        assert!(campaign_build_login(client, user.as_ptr(), std::ptr::null()).is_null());
        campaign_client_free(client);
    }

    #[test]
    fn parse_success_returns_data_json() {
        let result = parse(
            FfiOperation::Login,
            200,
            r#"{"access_token":"tok","token_type":"bearer"}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.http_status, 200);
        assert!(r.error_json.is_null());
        assert_eq!(json_of(r.data_json)["access_token"], "tok");
        campaign_free_result(result);
    }

    #[test]
    fn parse_rejection_passes_body_through() {
        let result = parse(FfiOperation::AddLead, 409, r#"{"detail":"exists","code":7}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Rejected);
        assert_eq!(r.http_status, 409);
        assert!(r.data_json.is_null());
        assert_eq!(json_of(r.error_json), json!({"detail":"exists","code":7}));
        campaign_free_result(result);
    }

    #[test]
    fn parse_unstructured_rejection_uses_fallback() {
        let result = parse(FfiOperation::CreateCampaign, 500, "Internal Server Error");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Rejected);
        assert_eq!(r.http_status, 500);
        assert_eq!(json_of(r.error_json), json!({"detail":"Failed to create campaign"}));
        campaign_free_result(result);
    }

    #[test]
    fn parse_transport_failure_uses_fallback() {
        let client = new_client();
        let resp = FfiHttpResponse {
            status: 0,
            body: std::ptr::null(),
            transport_failed: true,
        };
        let result = campaign_parse_response(client, FfiOperation::Login, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Rejected);
        assert_eq!(r.http_status, 0);
        assert_eq!(json_of(r.error_json), json!({"detail":"Login failed"}));
        campaign_free_result(result);
        campaign_client_free(client);
    }

    #[test]
    fn parse_listing_failure_is_empty_ok() {
        let result = parse(FfiOperation::ListCustomers, 401, r#"{"detail":"Invalid token"}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.http_status, 401);
        assert_eq!(json_of(r.data_json), json!([]));
        campaign_free_result(result);
    }

    #[test]
    fn parse_listing_transport_failure_has_no_status() {
        let client = new_client();
        let resp = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
            transport_failed: true,
        };
        let result = campaign_parse_response(client, FfiOperation::ListCampaigns, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.http_status, 0);
        assert_eq!(json_of(r.data_json), json!([]));
        campaign_free_result(result);
        campaign_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let resp = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
            transport_failed: false,
        };
        let result = campaign_parse_response(std::ptr::null(), FfiOperation::StartCall, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(json_of(r.error_json)["detail"], "null argument: client");
        campaign_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client();
        let result = campaign_parse_response(client, FfiOperation::StartCall, std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        campaign_free_result(result);
        campaign_client_free(client);
    }

    #[test]
    fn operations_cover_the_core() {
        let mapped: Vec<campaign_core::Operation> = [
            FfiOperation::RegisterCompany,
            FfiOperation::Login,
            FfiOperation::ChangePassword,
            FfiOperation::ForgotPassword,
            FfiOperation::VerifyOtp,
            FfiOperation::ResetPassword,
            FfiOperation::CreateCampaign,
            FfiOperation::RegisterCustomerData,
            FfiOperation::MakeCalls,
            FfiOperation::StartCall,
            FfiOperation::ListCampaigns,
            FfiOperation::ListCampaignStats,
            FfiOperation::ListCustomers,
            FfiOperation::AgentMetrics,
            FfiOperation::LeadVariables,
            FfiOperation::FetchLeads,
            FfiOperation::AddLead,
            FfiOperation::DeleteLead,
            FfiOperation::ListAgents,
        ]
        .into_iter()
        .map(Into::into)
        .collect();
        assert_eq!(mapped, campaign_core::Operation::ALL);
    }

    #[test]
    fn every_operation_builds_get_or_post() {
        let client = new_client();
        let token = c("T");
        let id = c("7");
        for op in [
            FfiOperation::ListCampaigns,
            FfiOperation::ListCustomers,
            FfiOperation::FetchLeads,
            FfiOperation::DeleteLead,
            FfiOperation::StartCall,
        ] {
            let req = campaign_build_request(
                client,
                op,
                token.as_ptr(),
                std::ptr::null(),
                id.as_ptr(),
            );
            let expected = match op {
                FfiOperation::StartCall => FfiHttpMethod::Post,
                _ => FfiHttpMethod::Get,
            };
            assert_eq!(unsafe { &*req }.method, expected, "{op:?}");
            campaign_free_request(req);
        }
        assert_eq!(FfiHttpMethod::Get as i32, 0);
        assert_eq!(FfiHttpMethod::Post as i32, 1);
        campaign_client_free(client);
    }

    #[test]
    fn interior_nul_is_dropped() {
        let s = types::c_string("a\0b");
        assert_eq!(unsafe { CStr::from_ptr(s) }.to_str().unwrap(), "ab");
        campaign_free_string(s);
    }

    #[test]
    fn free_request_null_is_safe() {
        campaign_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        campaign_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        campaign_free_string(std::ptr::null_mut());
    }
}
