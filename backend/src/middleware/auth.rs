//! Authentication middleware
//!
//! Verifies the bearer token, then stores the caller's [`AuthContext`] in the
//! request extensions for handlers to pick up through [`CurrentUser`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use shared::{AuthContext, UserRole};

use crate::error::{AppError, AppResult};
use crate::services::auth::decode_token;
use crate::AppState;

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(authorization)) = bearer else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    let context = match decode_token(authorization.token(), &state.config.jwt.secret)
        .and_then(|claims| claims.into_context())
    {
        Ok(context) => context,
        Err(_) => return unauthorized_response("Invalid or expired token"),
    };

    tracing::debug!(user_id = %context.user_id, role = %context.role, "Authenticated request");

    request.extensions_mut().insert(context);

    next.run(request).await
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

/// Extractor for the authenticated caller
/// Use this in handlers to get the current user's context
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthContext);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Role guard for use in handlers
pub fn require_role(ctx: &AuthContext, allowed: &[UserRole]) -> AppResult<()> {
    if allowed.contains(&ctx.role) {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ctx(role: UserRole) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role,
            warehouse_id: None,
            department_id: None,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&ctx(UserRole::SuperAdmin), &[UserRole::SuperAdmin]).is_ok());
        assert!(matches!(
            require_role(&ctx(UserRole::Manager), &[UserRole::SuperAdmin]),
            Err(AppError::InsufficientPermissions)
        ));
        assert!(require_role(&ctx(UserRole::Unknown), &[]).is_err());
    }
}
