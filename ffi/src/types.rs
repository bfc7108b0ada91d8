//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests go out as C-compatible plain data: a C-string URL, an array of
//! C-string header pairs and a byte buffer body (multipart uploads are not
//! text). Results come back as JSON text so the host decodes every operation
//! the same way, with an error code telling it which field to read.

use std::ffi::CString;
use std::os::raw::c_char;

use campaign_core::{ApiError, HttpMethod, HttpRequest, Operation};

/// Opaque handle to a `CampaignClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiCampaignClient {
    pub(crate) inner: campaign_core::CampaignClient,
}

/// Heap C string from `s`. Interior NULs are dropped.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    let cstring = CString::new(s).unwrap_or_else(|err| {
        let mut bytes = err.into_vec();
        bytes.retain(|b| *b != 0);
        CString::new(bytes).unwrap_or_default()
    });
    cstring.into_raw()
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Remote operation selector. Values are stable.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOperation {
    RegisterCompany = 0,
    Login = 1,
    ChangePassword = 2,
    ForgotPassword = 3,
    VerifyOtp = 4,
    ResetPassword = 5,
    CreateCampaign = 6,
    RegisterCustomerData = 7,
    MakeCalls = 8,
    StartCall = 9,
    ListCampaigns = 10,
    ListCampaignStats = 11,
    ListCustomers = 12,
    AgentMetrics = 13,
    LeadVariables = 14,
    FetchLeads = 15,
    AddLead = 16,
    DeleteLead = 17,
    ListAgents = 18,
}

impl From<FfiOperation> for Operation {
    fn from(op: FfiOperation) -> Self {
        match op {
            FfiOperation::RegisterCompany => Operation::RegisterCompany,
            FfiOperation::Login => Operation::Login,
            FfiOperation::ChangePassword => Operation::ChangePassword,
            FfiOperation::ForgotPassword => Operation::ForgotPassword,
            FfiOperation::VerifyOtp => Operation::VerifyOtp,
            FfiOperation::ResetPassword => Operation::ResetPassword,
            FfiOperation::CreateCampaign => Operation::CreateCampaign,
            FfiOperation::RegisterCustomerData => Operation::RegisterCustomerData,
            FfiOperation::MakeCalls => Operation::MakeCalls,
            FfiOperation::StartCall => Operation::StartCall,
            FfiOperation::ListCampaigns => Operation::ListCampaigns,
            FfiOperation::ListCampaignStats => Operation::ListCampaignStats,
            FfiOperation::ListCustomers => Operation::ListCustomers,
            FfiOperation::AgentMetrics => Operation::AgentMetrics,
            FfiOperation::LeadVariables => Operation::LeadVariables,
            FfiOperation::FetchLeads => Operation::FetchLeads,
            FfiOperation::AddLead => Operation::AddLead,
            FfiOperation::DeleteLead => Operation::DeleteLead,
            FfiOperation::ListAgents => Operation::ListAgents,
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `campaign_build_*`. The host sends `body_len` bytes from `body`
/// (null when there is no body) and frees the request with
/// `campaign_free_request`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = c_string(req.url);

        let (body, body_len) = match req.body {
            Some(bytes) => {
                let len = bytes.len();
                (Box::into_raw(bytes.into_boxed_slice()) as *mut u8, len)
            }
            None => (std::ptr::null_mut(), 0),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            body_len,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// The outcome of executing a request, as reported by the host.
///
/// Set `transport_failed` when no response arrived at all; `status` and
/// `body` are then ignored. The FFI layer reads but does not free these
/// fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
    pub transport_failed: bool,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCampaignResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    /// The call failed; `error_json` holds the server body or the fallback.
    Rejected = 1,
    Deserialization = 2,
    Serialization = 3,
    InvalidInput = 4,
    Panic = 5,
    NullArg = 6,
}

/// Result envelope for `campaign_parse_response`.
///
/// On success `error_code` is `Ok`, `data_json` holds the payload and
/// `error_json` is null. Otherwise `error_json` holds a JSON error object
/// (always carrying `detail` for non-`Rejected` codes) and `data_json` is
/// null. `http_status` is the status of the response the host reported, or 0
/// when no response was received.
#[repr(C)]
pub struct FfiCampaignResult {
    pub error_code: FfiErrorCode,
    pub http_status: u16,
    pub error_json: *mut c_char,
    pub data_json: *mut c_char,
}

impl FfiCampaignResult {
    fn boxed(
        error_code: FfiErrorCode,
        http_status: u16,
        error_json: *mut c_char,
        data_json: *mut c_char,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiCampaignResult {
            error_code,
            http_status,
            error_json,
            data_json,
        }))
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, message: &str) -> *mut Self {
        let error = serde_json::json!({ "detail": message }).to_string();
        Self::boxed(error_code, http_status, c_string(error), std::ptr::null_mut())
    }

    /// Build a success result carrying `data` as JSON text.
    pub(crate) fn ok(http_status: u16, data: &serde_json::Value) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Ok,
            http_status,
            std::ptr::null_mut(),
            c_string(data.to_string()),
        )
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        match err {
            ApiError::Rejected { status, payload } => Self::boxed(
                FfiErrorCode::Rejected,
                status.unwrap_or(0),
                c_string(payload.as_value().to_string()),
                std::ptr::null_mut(),
            ),
            ApiError::Deserialization(_) => {
                Self::failure(FfiErrorCode::Deserialization, 0, &err.to_string())
            }
            ApiError::Serialization(_) => {
                Self::failure(FfiErrorCode::Serialization, 0, &err.to_string())
            }
            ApiError::InvalidInput(_) => {
                Self::failure(FfiErrorCode::InvalidInput, 0, &err.to_string())
            }
        }
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, &format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg)
    }
}
