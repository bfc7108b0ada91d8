//! The I/O seam: something that can carry an `HttpRequest` to the server.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one request. Non-2xx statuses are returned as responses; only
/// failures to get any response at all are `TransportError`s.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport on a shared `ureq` agent.
    ///
    /// Status-as-error is disabled so 4xx/5xx bodies reach the settler.
    /// No timeouts are configured: a hung request blocks its caller.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let result = match request.method {
                HttpMethod::Get => {
                    let mut builder = self.agent.get(&request.url);
                    for (key, value) in &request.headers {
                        builder = builder.header(key, value);
                    }
                    builder.call()
                }
                HttpMethod::Post => {
                    let mut builder = self.agent.post(&request.url);
                    for (key, value) in &request.headers {
                        builder = builder.header(key, value);
                    }
                    match &request.body {
                        Some(body) => builder.send(body.as_slice()),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result.map_err(|e| TransportError(e.to_string()))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
                .collect();
            // Bodies are decoded lossily so a non-UTF-8 error page keeps its status.
            let bytes = response
                .body_mut()
                .read_to_vec()
                .map_err(|e| TransportError(e.to_string()))?;
            let body = String::from_utf8_lossy(&bytes).into_owned();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
