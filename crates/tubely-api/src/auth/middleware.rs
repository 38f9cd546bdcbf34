use crate::auth::models::AuthUser;
use crate::auth::JwtService;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header =
        header.ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })?;

    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty bearer token".to_string()));
    }
    Ok(token)
}

pub async fn auth_middleware(
    State(jwt): State<Arc<JwtService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let user_id = match bearer_token(header).and_then(|token| jwt.validate(token)) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(error = %e, "Authentication failed");
            return HttpAppError(e).into_response();
        }
    };

    request.extensions_mut().insert(AuthUser { user_id });

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert!(bearer_token(None).is_err());
        assert!(bearer_token(Some("Basic abc")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
    }
}
