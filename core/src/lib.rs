//! Synchronous client core for the campaign management API.
//!
//! # Overview
//! Builds `HttpRequest` values and settles their outcomes without touching
//! the network (host-does-IO pattern). The host executes the round-trip:
//! a native app through the FFI crate, or Rust code through a `Transport`
//! and the `Facade`.
//!
//! # Design
//! - `CampaignClient` is stateless; it holds only `base_url`.
//! - Every endpoint is a row in `route`: method, path, auth, body encoding,
//!   failure policy and fallback message. The typed `build_*`/`parse_*`
//!   pairs are thin wrappers over one request helper and one settler.
//! - Failures surface as one shape, `ErrorPayload`. The three listing
//!   endpoints soft-fail to empty lists and log a warning instead.
//! - Credentials are explicit: authenticated calls take a `Session`.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod facade;
pub mod form;
pub mod http;
pub mod route;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{settle, CampaignClient, OnError};
pub use config::ClientConfig;
pub use dispatch::OperationInput;
pub use error::{ApiError, ErrorPayload, StoreError, TransportError};
pub use facade::{Facade, SignInError};
pub use form::MultipartForm;
pub use http::{Exchange, HttpMethod, HttpRequest, HttpResponse};
pub use route::{Operation, Route};
pub use session::{FileStore, MemoryStore, Session, TokenStore, TOKEN_KEY};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::*;
