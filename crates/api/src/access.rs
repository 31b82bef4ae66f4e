//! Per-route authorization. Shipping lookups stay open; handlers that take a
//! [`Permitted`] argument are gated by the configured [`AccessPolicy`].

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};

use crate::{handlers::ApiError, state::AppState};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    #[default]
    AllowAny,
    /// Requires `Authorization: Bearer <token>`.
    BearerToken(String),
}

impl AccessPolicy {
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(token) => Self::BearerToken(token.to_owned()),
            None => Self::AllowAny,
        }
    }

    pub fn permits(&self, req: &HttpRequest) -> bool {
        match self {
            Self::AllowAny => true,
            Self::BearerToken(expected) => req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .is_some_and(|presented| constant_time_eq(presented, expected)),
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a
        .bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}

/// Extractor proving the request passed the access policy.
#[derive(Debug, Clone, Copy)]
pub struct Permitted;

impl FromRequest for Permitted {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let allowed = req
            .app_data::<web::Data<AppState>>()
            .is_some_and(|state| state.access_policy().permits(req));
        ready(if allowed {
            Ok(Permitted)
        } else {
            Err(ApiError::Forbidden)
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn allow_any_permits_anonymous_requests() {
        let req = TestRequest::default().to_http_request();
        assert!(AccessPolicy::AllowAny.permits(&req));
        assert_eq!(AccessPolicy::from_token(None), AccessPolicy::AllowAny);
    }

    #[test]
    fn bearer_token_must_match() {
        let policy = AccessPolicy::from_token(Some("s3cret"));
        let anonymous = TestRequest::default().to_http_request();
        assert!(!policy.permits(&anonymous));

        let wrong = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer nope"))
            .to_http_request();
        assert!(!policy.permits(&wrong));

        let basic = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic s3cret"))
            .to_http_request();
        assert!(!policy.permits(&basic));

        let valid = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer s3cret"))
            .to_http_request();
        assert!(policy.permits(&valid));
    }

    #[test]
    fn bearer_token_is_compared_verbatim() {
        let policy = AccessPolicy::from_token(Some("s3cret"));
        for header in ["Bearer  s3cret", "Bearer s3cret ", "Bearer s3cre", "Bearer s3cret2"] {
            let req = TestRequest::default()
                .insert_header((AUTHORIZATION, header))
                .to_http_request();
            assert!(!policy.permits(&req), "{header:?} accepted");
        }
        assert!(constant_time_eq("", ""));
        assert!(!constant_time_eq("abc", "abd"));
    }
}
