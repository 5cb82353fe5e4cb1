//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{AuthContext, UserRole};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::User;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering a user account
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<UserRole>,
    pub role_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

/// Response after successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub role: UserRole,
    pub warehouse_id: Option<String>,
    pub department_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Build the request context; malformed ids reject the token
    pub fn into_context(self) -> AppResult<AuthContext> {
        let parse = |value: Option<String>| -> AppResult<Option<Uuid>> {
            value
                .filter(|v| !v.is_empty())
                .map(|v| Uuid::parse_str(&v).map_err(|_| AppError::InvalidToken))
                .transpose()
        };

        Ok(AuthContext {
            user_id: Uuid::parse_str(&self.sub).map_err(|_| AppError::InvalidToken)?,
            role: self.role,
            warehouse_id: parse(self.warehouse_id)?,
            department_id: parse(self.department_id)?,
        })
    }
}

/// Decode and validate a token signed with `secret`
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        AppError::InvalidToken
    })
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new user account
    pub async fn register(&self, input: RegisterInput) -> AppResult<User> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let role = input.role.unwrap_or(UserRole::WarehouseUser);
        if !role.is_assignable() {
            return Err(AppError::Validation {
                field: "role".to_string(),
                message: "Unknown role".to_string(),
            });
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, role_id, warehouse_id, department_id)
            VALUES ($1, LOWER($2), $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.name.trim())
        .bind(input.email.trim())
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(input.role_id)
        .bind(input.warehouse_id)
        .bind(input.department_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "email"))?;

        tracing::info!("Registered user {} with role {}", user.id, role);

        Ok(user)
    }

    /// Login with email and password
    ///
    /// Unknown emails, wrong passwords and soft-deleted accounts all get the
    /// same answer.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.db)
            .await?;

        let user = check_credentials(user, password)?;
        let token = self.generate_token(&user)?;

        Ok(LoginResponse { token, user })
    }

    fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role(),
            warehouse_id: user.warehouse_id.map(|id| id.to_string()),
            department_id: user.department_id.map(|id| id.to_string()),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }
}

/// Accept `user` only if it exists, is not soft-deleted and `password`
/// matches its hash. Every rejection is `InvalidCredentials`.
fn check_credentials(user: Option<User>, password: &str) -> AppResult<User> {
    let user = user
        .filter(|u| !u.is_deleted)
        .ok_or(AppError::InvalidCredentials)?;

    let valid = verify(password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_for(claims: &Claims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn claims(warehouse_id: Option<String>) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "clerk@example.com".to_string(),
            role: UserRole::WarehouseUser,
            warehouse_id,
            department_id: None,
            exp: now + 3600,
            iat: now,
        }
    }

    fn account(password: &str, is_deleted: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Clerk".to_string(),
            email: "clerk@example.com".to_string(),
            password_hash: hash(password, 4).unwrap(),
            role: UserRole::WarehouseUser.as_str().to_string(),
            role_id: None,
            warehouse_id: None,
            department_id: None,
            is_deleted,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_account_logs_in() {
        let user = check_credentials(Some(account("s3cret", false)), "s3cret").unwrap();
        assert_eq!(user.email, "clerk@example.com");
    }

    #[test]
    fn test_soft_deleted_account_rejected() {
        let result = check_credentials(Some(account("s3cret", true)), "s3cret");
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_wrong_password_and_unknown_email_rejected() {
        let wrong = check_credentials(Some(account("s3cret", false)), "guess");
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
        assert!(matches!(check_credentials(None, "s3cret"), Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_token_roundtrip_builds_context() {
        let warehouse = Uuid::new_v4();
        let token = token_for(&claims(Some(warehouse.to_string())), "test-secret");
        let ctx = decode_token(&token, "test-secret").unwrap().into_context().unwrap();
        assert_eq!(ctx.role, UserRole::WarehouseUser);
        assert_eq!(ctx.warehouse_id, Some(warehouse));
        assert_eq!(ctx.department_id, None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = token_for(&claims(None), "test-secret");
        assert!(matches!(decode_token(&token, "other"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_malformed_warehouse_id_rejected() {
        let result = claims(Some("not-a-uuid".to_string())).into_context();
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_register_input_validation() {
        let input = RegisterInput {
            name: "Clerk".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            role: None,
            role_id: None,
            warehouse_id: None,
            department_id: None,
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
