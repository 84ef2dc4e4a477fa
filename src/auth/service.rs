//! User registration, login and JWT lifecycle.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::password;
use crate::account::{AccountRepository, User, UserRepository};
use crate::core_types::UserId;
use crate::error::BankError;
use crate::money::Amount;

const TOKEN_TTL_HOURS: i64 = 1;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: usize,  // expiration (UTC timestamp)
    pub iat: usize,  // issued at
    pub jti: String, // token id, for revocation
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, BankError> {
        self.sub.parse().map_err(|_| BankError::Unauthorized)
    }
}

/// User Registration Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 120))]
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[validate(length(min = 11, max = 14))]
    #[schema(example = "12345678901")]
    pub cpf: String,
    #[validate(length(min = 8, max = 20))]
    #[schema(example = "+5511998765432")]
    pub phone: String,
    #[validate(email)]
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[validate(length(min = 8))]
    #[schema(example = "password123")]
    pub password: String,
}

/// User Login Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "12345678901")]
    pub cpf: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Auth Response (JWT + account summary)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    #[schema(example = "48213-7")]
    pub account_number: String,
    #[schema(value_type = String, example = "300.00")]
    pub balance: Amount,
}

/// User profile, password hash excluded.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    #[schema(value_type = String)]
    pub id: UserId,
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            cpf: u.cpf,
            phone: u.phone,
            email: u.email,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    jwt_secret: String,
    starter_balance: Amount,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt_secret: String, starter_balance: Amount) -> Self {
        Self {
            pool,
            jwt_secret,
            starter_balance,
        }
    }

    /// Register a new user. The user row, their single account (opened
    /// with the starter balance) and the session token are produced in
    /// one go; a duplicate cpf/phone/email aborts everything.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, BankError> {
        let password_hash = password::hash(&req.password)?;

        let (user, account) = AccountRepository::register_user_with_account(
            &self.pool,
            &req.name,
            &req.cpf,
            &req.phone,
            &req.email,
            &password_hash,
            self.starter_balance,
        )
        .await?;

        tracing::info!(user = %user.id, account = %account.id, "user registered");

        let token = self.issue_token(user.id)?;
        Ok(AuthResponse {
            token,
            user_id: user.id,
            name: user.name,
            email: user.email,
            account_number: account.account_number,
            balance: account.balance,
        })
    }

    /// Login with cpf + password, issuing a fresh JWT.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, BankError> {
        let user = UserRepository::get_by_cpf(&self.pool, &req.cpf)
            .await?
            .ok_or(BankError::Unauthorized)?;

        if !password::verify(&req.password, &user.password_hash) {
            return Err(BankError::Unauthorized);
        }

        let account = AccountRepository::get_by_user(&self.pool, user.id)
            .await?
            .ok_or(BankError::NotFound("account"))?;

        let token = self.issue_token(user.id)?;
        Ok(AuthResponse {
            token,
            user_id: user.id,
            name: user.name,
            email: user.email,
            account_number: account.account_number,
            balance: account.balance,
        })
    }

    pub async fn me(&self, user_id: UserId) -> Result<UserProfile, BankError> {
        UserRepository::get_by_id(&self.pool, user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(BankError::NotFound("user"))
    }

    /// Revoke the presented token. The `jti` is persisted with the
    /// token's own expiry, so revocation survives restarts and is
    /// shared across instances; rows become garbage once expired.
    pub async fn logout(&self, claims: &Claims) -> Result<(), BankError> {
        let expires_at = chrono::DateTime::from_timestamp(claims.exp as i64, 0)
            .unwrap_or_else(Utc::now);

        sqlx::query(
            r#"INSERT INTO revoked_tokens (jti, expires_at)
               VALUES ($1, $2)
               ON CONFLICT (jti) DO NOTHING"#,
        )
        .bind(&claims.jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn is_revoked(&self, jti: &str) -> Result<bool, BankError> {
        let row = sqlx::query("SELECT 1 AS one FROM revoked_tokens WHERE jti = $1")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    fn issue_token(&self, user_id: UserId) -> Result<String, BankError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
            .ok_or(BankError::Internal)?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!("failed to issue token: {}", e);
            BankError::Internal
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, BankError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| BankError::Unauthorized)
    }
}
