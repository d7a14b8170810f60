use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, web};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::middleware::RequestId;

/// Caller identity resolved from a valid bearer token.
///
/// Taking it as a handler argument makes the route require authentication:
/// requests without a valid token are answered with 401 before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(*user)),
            None => ready(Err(DomainError::Unauthenticated.into())),
        }
    }
}

/// Reads an `Authorization: Bearer <token>` header value. The scheme name is
/// matched case-insensitively.
pub fn extract_user_from_header(
    header: Option<&str>,
    keys: &JwtKeys,
) -> Option<AuthenticatedUser> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    keys.identify(token.trim()).ok().map(|id| AuthenticatedUser { id })
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}

/// Malformed JSON bodies are reported as validation errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        DomainError::validation("body", format!("invalid request body: {err}")).into()
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn bearer_header_resolves_identity() {
        let keys = JwtKeys::new("secret".into(), Duration::hours(1));
        let id = Uuid::new_v4();
        let header = format!("Bearer {}", keys.generate_token(id).unwrap());

        let user = extract_user_from_header(Some(&header), &keys).unwrap();
        assert_eq!(user.id, id);
    }

    #[test]
    fn scheme_name_is_case_insensitive() {
        let keys = JwtKeys::new("secret".into(), Duration::hours(1));
        let id = Uuid::new_v4();
        let token = keys.generate_token(id).unwrap();

        for scheme in ["bearer", "BEARER", "BeArEr"] {
            let header = format!("{scheme} {token}");
            let user = extract_user_from_header(Some(&header), &keys).unwrap();
            assert_eq!(user.id, id);
        }
    }

    #[test]
    fn missing_or_malformed_header_yields_no_identity() {
        let keys = JwtKeys::new("secret".into(), Duration::hours(1));
        let token = keys.generate_token(Uuid::new_v4()).unwrap();

        assert!(extract_user_from_header(None, &keys).is_none());
        assert!(extract_user_from_header(Some(&token), &keys).is_none());
        assert!(extract_user_from_header(Some("Bearer garbage"), &keys).is_none());
        assert!(extract_user_from_header(Some(&format!("Basic {token}")), &keys).is_none());
    }
}
