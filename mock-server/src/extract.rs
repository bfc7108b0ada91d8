use axum::extract::{FromRequest, FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiFailure;
use crate::state::{AppState, CompanyRow};

/// `Json<T>` whose rejections render as `{"detail": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiFailure))]
pub struct Payload<T>(pub T);

/// `Form<T>` whose rejections render as `{"detail": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(ApiFailure))]
pub struct FormPayload<T>(pub T);

/// `Query<T>` whose rejections render as `{"detail": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiFailure))]
pub struct QueryParams<T>(pub T);

/// The company behind the request's bearer token.
pub struct CurrentCompany(pub CompanyRow);

impl FromRequestParts<AppState> for CurrentCompany {
    type Rejection = ApiFailure;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiFailure::NotAuthenticated)?;

        let db = state.db.read().await;
        let company_id = db.session(token).ok_or(ApiFailure::InvalidToken)?;
        let company = db
            .company(company_id)
            .cloned()
            .ok_or_else(|| ApiFailure::NotFound("Company not found".to_string()))?;
        Ok(CurrentCompany(company))
    }
}
