//! Local accounts backed by SQLite.
//!
//! Sign-up confirms the account immediately. Login creates a server-side
//! session whose token is the access token. Password reset codes are stored
//! with a TTL and written to the log instead of being mailed.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use spendtrack_core::api::{validate_email, validate_password_strength};
use spendtrack_core::auth::{
    calculate_expiry, display_name, encode_demo_id_token, generate_reset_code,
    generate_session_token, is_expired, AuthError, AuthService, AuthTokens, AuthenticatedUser,
    DemoIdTokenClaims, ProfileUpdate, Result, SignupOutcome, UserId, UserProfile,
};
use spendtrack_core::deployment::DeploymentMode;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::sessions::{parse_timestamp, Session, SessionStore};

/// Wrong guesses allowed per reset code before it is locked.
const MAX_RESET_ATTEMPTS: i64 = 5;

const MAX_NAME_LEN: usize = 100;

struct Account {
    id: UserId,
    email: String,
    password_hash: String,
    name: Option<String>,
    confirmed: bool,
}

impl Account {
    fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| display_name(&self.email))
    }

    fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.id.clone(),
            email: self.email.clone(),
            name: self.display_name(),
            email_verified: self.confirmed,
        }
    }
}

type AccountRow = (String, String, String, Option<String>, bool);

impl From<AccountRow> for Account {
    fn from((id, email, password_hash, name, confirmed): AccountRow) -> Self {
        Self {
            id: UserId::new(id),
            email,
            password_hash,
            name,
            confirmed,
        }
    }
}

/// `AuthService` for local demo deployments.
#[derive(Clone)]
pub struct LocalAuthService {
    pool: SqlitePool,
    sessions: SessionStore,
    session_ttl: Duration,
    reset_code_ttl: Duration,
}

impl LocalAuthService {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        Self {
            sessions: SessionStore::new(pool.clone()),
            pool,
            session_ttl: to_chrono(config.session_ttl),
            reset_code_ttl: to_chrono(config.reset_code_ttl),
        }
    }

    /// Opens (creating if needed) the database at `config.database_url` and
    /// runs migrations.
    pub async fn connect(config: &AuthConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .create_if_missing(true);
        // Every connection to `:memory:` opens its own database.
        let pool_options = if config.database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let service = Self::new(pool, config);
        service.migrate().await?;
        Ok(service)
    }

    /// Runs database migrations to create required tables.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT,
                confirmed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reset_codes (
                email TEXT PRIMARY KEY,
                code TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        self.sessions.migrate().await
    }

    /// Deletes expired sessions. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.sessions.purge_expired(Utc::now()).await
    }

    /// Spawns a task that purges expired sessions every `period`.
    ///
    /// The first purge runs immediately. `period` must be non-zero.
    pub fn spawn_session_purge(&self, period: std::time::Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match service.purge_expired_sessions().await {
                    Ok(0) => {}
                    Ok(purged) => tracing::info!(purged, "Purged expired sessions"),
                    Err(err) => tracing::warn!(error = %err, "Failed to purge expired sessions"),
                }
            }
        })
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, email, password_hash, name, confirmed FROM accounts WHERE email = ?",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Account::from))
    }

    async fn find_account_by_id(&self, id: &UserId) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, email, password_hash, name, confirmed FROM accounts WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Account::from))
    }

    async fn set_password(&self, id: &UserId, new_password: &str) -> Result<()> {
        let hash = hash_password_blocking(new_password.to_string()).await?;
        sqlx::query("UPDATE accounts SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(hash)
            .bind(Utc::now().to_rfc3339())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    /// Resolves a session token to its account, dropping expired sessions.
    async fn session_account(&self, access_token: &str) -> Result<Account> {
        let session = self
            .sessions
            .get_session(access_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if session.is_expired(Utc::now()) {
            self.sessions.delete_session(access_token).await?;
            return Err(AuthError::InvalidToken);
        }

        self.find_account_by_id(&session.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Checks `code` against the stored reset code for `email`.
    ///
    /// Each check claims an attempt in the same statement that enforces the
    /// limit, so concurrent guesses cannot exceed [`MAX_RESET_ATTEMPTS`]. A
    /// correct code gives its attempt back.
    async fn check_reset_code(&self, email: &str, code: &str) -> Result<()> {
        let email = normalize_email(email);
        let claimed = sqlx::query_as::<_, (String, String)>(
            "UPDATE reset_codes SET attempts = attempts + 1 WHERE email = ? AND attempts < ? RETURNING code, expires_at",
        )
        .bind(&email)
        .bind(MAX_RESET_ATTEMPTS)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some((stored, expires_at)) = claimed else {
            return Err(self.unclaimable_reset_code(&email).await?);
        };

        if is_expired(parse_timestamp(&expires_at)?, Utc::now()) {
            return Err(AuthError::ExpiredCode);
        }
        if stored != code.trim() {
            return Err(AuthError::CodeMismatch);
        }

        sqlx::query("UPDATE reset_codes SET attempts = attempts - 1 WHERE email = ? AND attempts > 0")
            .bind(&email)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    /// Why no attempt could be claimed: no code, an expired one, or the limit.
    async fn unclaimable_reset_code(&self, email: &str) -> Result<AuthError> {
        let expires_at = sqlx::query_as::<_, (String,)>(
            "SELECT expires_at FROM reset_codes WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some((expires_at,)) = expires_at else {
            return Ok(AuthError::CodeMismatch);
        };
        if is_expired(parse_timestamp(&expires_at)?, Utc::now()) {
            Ok(AuthError::ExpiredCode)
        } else {
            Ok(AuthError::LimitExceeded)
        }
    }
}

#[async_trait]
impl AuthService for LocalAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let account = self
            .find_account_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password_blocking(password.to_string(), account.password_hash.clone()).await? {
            tracing::debug!(user_id = %account.id, "Rejected login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        if !account.confirmed {
            return Err(AuthError::UserNotConfirmed);
        }

        let now = Utc::now();
        let session = Session {
            token: generate_session_token(),
            user_id: account.id.clone(),
            created_at: now,
            expires_at: calculate_expiry(now, self.session_ttl),
        };
        self.sessions.create_session(&session).await?;

        let id_token =
            encode_demo_id_token(&DemoIdTokenClaims::new(account.id.as_str(), &account.email, now))?;

        tracing::info!(user_id = %account.id, "User logged in");

        Ok(AuthTokens {
            access_token: session.token,
            id_token,
            refresh_token: None,
            expires_in: self.session_ttl.num_seconds(),
        })
    }

    async fn signup(&self, email: &str, password: &str) -> Result<SignupOutcome> {
        validate_email(email).map_err(|reason| AuthError::validation("email", reason))?;
        validate_password_strength(password).map_err(|_| AuthError::InvalidPassword)?;

        let email = normalize_email(email);
        if self.find_account_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let id = UserId::new(Uuid::new_v4().to_string());
        let hash = hash_password_blocking(password.to_string()).await?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO accounts (id, email, password_hash, name, confirmed, created_at, updated_at) VALUES (?, ?, ?, NULL, 1, ?, ?)",
        )
        .bind(id.as_str())
        .bind(&email)
        .bind(hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AuthError::UserAlreadyExists
            }
            other => storage_error(other),
        })?;

        tracing::info!(user_id = %id, "Account created");

        Ok(SignupOutcome {
            user_id: id,
            email,
            confirmed: true,
        })
    }

    async fn confirm_signup(&self, email: &str, code: &str) -> Result<()> {
        if code.trim().is_empty() {
            return Err(AuthError::validation("code", "code is required"));
        }

        let account = self
            .find_account_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        sqlx::query("UPDATE accounts SET confirmed = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(account.id.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<()> {
        let account = self
            .find_account_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let code = generate_reset_code();
        let expires_at = calculate_expiry(Utc::now(), self.reset_code_ttl);

        sqlx::query(
            "INSERT OR REPLACE INTO reset_codes (email, code, expires_at, attempts) VALUES (?, ?, ?, 0)",
        )
        .bind(&account.email)
        .bind(&code)
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        // No mail delivery in local mode.
        tracing::info!(
            email = %account.email,
            %code,
            expires_at = %expires_at,
            "Password reset code issued"
        );

        Ok(())
    }

    async fn verify_reset_code(&self, email: &str, code: &str) -> Result<()> {
        self.check_reset_code(email, code).await
    }

    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        self.check_reset_code(email, code).await?;
        validate_password_strength(new_password).map_err(|_| AuthError::InvalidPassword)?;

        let account = self
            .find_account_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.set_password(&account.id, new_password).await?;
        sqlx::query("DELETE FROM reset_codes WHERE email = ?")
            .bind(&account.email)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        self.sessions.delete_user_sessions(&account.id).await?;

        tracing::info!(user_id = %account.id, "Password reset");
        Ok(())
    }

    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let account = self.session_account(access_token).await?;

        if !verify_password_blocking(current_password.to_string(), account.password_hash.clone())
            .await?
        {
            return Err(AuthError::IncorrectPassword);
        }
        validate_password_strength(new_password).map_err(|_| AuthError::InvalidPassword)?;

        self.set_password(&account.id, new_password).await?;
        self.sessions.delete_user_sessions(&account.id).await?;

        tracing::info!(user_id = %account.id, "Password changed");
        Ok(())
    }

    async fn get_user_profile(&self, access_token: &str) -> Result<UserProfile> {
        Ok(self.session_account(access_token).await?.profile())
    }

    async fn update_user_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile> {
        let mut account = self.session_account(access_token).await?;

        if let Some(name) = &update.name {
            let name = name.trim();
            if name.chars().count() > MAX_NAME_LEN {
                return Err(AuthError::validation(
                    "name",
                    format!("must be at most {MAX_NAME_LEN} characters"),
                ));
            }

            sqlx::query("UPDATE accounts SET name = ?, updated_at = ? WHERE id = ?")
                .bind(name)
                .bind(Utc::now().to_rfc3339())
                .bind(account.id.as_str())
                .execute(&self.pool)
                .await
                .map_err(storage_error)?;
            account.name = Some(name.to_string());
        }

        Ok(account.profile())
    }

    async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser> {
        let account = self.session_account(access_token).await?;
        Ok(AuthenticatedUser {
            name: account.display_name(),
            user_id: account.id,
            email: account.email,
            access_token: access_token.to_string(),
        })
    }

    async fn logout(&self, access_token: &str) -> Result<()> {
        self.sessions.delete_session(access_token).await
    }

    fn mode(&self) -> DeploymentMode {
        DeploymentMode::Local
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Longest TTL honoured; larger values are clamped so expiry math cannot overflow.
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

fn to_chrono(ttl: std::time::Duration) -> Duration {
    Duration::seconds(i64::try_from(ttl.as_secs().min(MAX_TTL_SECS)).unwrap_or(0))
}

fn storage_error(e: sqlx::Error) -> AuthError {
    AuthError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::memory_pool;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use chrono::DateTime;

    async fn create_service() -> LocalAuthService {
        let service = LocalAuthService::new(memory_pool().await, &AuthConfig::default());
        service.migrate().await.unwrap();
        service
    }

    async fn stored_reset_code(service: &LocalAuthService, email: &str) -> String {
        sqlx::query_as::<_, (String,)>("SELECT code FROM reset_codes WHERE email = ?")
            .bind(email)
            .fetch_one(&service.pool)
            .await
            .unwrap()
            .0
    }

    async fn set_reset_code_expiry(pool: &SqlitePool, email: &str, expires_at: DateTime<Utc>) {
        sqlx::query("UPDATE reset_codes SET expires_at = ? WHERE email = ?")
            .bind(expires_at.to_rfc3339())
            .bind(email)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_signup_and_login() {
        let service = create_service().await;

        let outcome = service
            .signup("Alice@Example.com", "password123")
            .await
            .unwrap();
        assert!(outcome.confirmed);
        assert_eq!(outcome.email, "alice@example.com");

        let tokens = service
            .login("alice@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(tokens.access_token.len(), 32);
        assert_eq!(tokens.expires_in, 24 * 60 * 60);
        assert!(tokens.refresh_token.is_none());

        let claims: DemoIdTokenClaims =
            serde_json::from_slice(&STANDARD.decode(&tokens.id_token).unwrap()).unwrap();
        assert_eq!(claims.sub, outcome.user_id.as_str());
        assert_eq!(claims.email, "alice@example.com");

        let user = service.authenticate(&tokens.access_token).await.unwrap();
        assert_eq!(user.user_id, outcome.user_id);
        assert_eq!(user.name, "alice");
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let service = create_service().await;
        service.signup("bob@example.com", "password123").await.unwrap();

        assert_eq!(
            service.signup("BOB@example.com", "password456").await,
            Err(AuthError::UserAlreadyExists)
        );
    }

    #[tokio::test]
    async fn test_signup_rejects_weak_password() {
        let service = create_service().await;
        assert_eq!(
            service.signup("c@example.com", "short").await,
            Err(AuthError::InvalidPassword)
        );
    }

    #[tokio::test]
    async fn test_login_failures() {
        let service = create_service().await;
        service.signup("dan@example.com", "password123").await.unwrap();

        assert_eq!(
            service.login("dan@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            service.login("nobody@example.com", "password123").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_unknown_and_expired_tokens() {
        let service = create_service().await;
        assert_eq!(
            service.authenticate("not-a-session").await,
            Err(AuthError::InvalidToken)
        );

        let outcome = service.signup("eve@example.com", "password123").await.unwrap();
        let now = Utc::now();
        service
            .sessions
            .create_session(&Session {
                token: "stale".to_string(),
                user_id: outcome.user_id,
                created_at: now - Duration::hours(2),
                expires_at: now - Duration::hours(1),
            })
            .await
            .unwrap();

        assert_eq!(
            service.authenticate("stale").await,
            Err(AuthError::InvalidToken)
        );
        assert!(service.sessions.get_session("stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let service = create_service().await;
        service.signup("f@example.com", "password123").await.unwrap();
        let tokens = service.login("f@example.com", "password123").await.unwrap();

        service.logout(&tokens.access_token).await.unwrap();
        assert_eq!(
            service.authenticate(&tokens.access_token).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_confirm_signup() {
        let service = create_service().await;
        service.signup("g@example.com", "password123").await.unwrap();

        service.confirm_signup("g@example.com", "123456").await.unwrap();
        assert_eq!(
            service.confirm_signup("missing@example.com", "123456").await,
            Err(AuthError::UserNotFound)
        );
        assert!(matches!(
            service.confirm_signup("g@example.com", " ").await,
            Err(AuthError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let service = create_service().await;
        service.signup("h@example.com", "password123").await.unwrap();
        let old = service.login("h@example.com", "password123").await.unwrap();

        service.forgot_password("h@example.com").await.unwrap();
        let code = stored_reset_code(&service, "h@example.com").await;
        assert_eq!(code.len(), 6);

        service.verify_reset_code("h@example.com", &code).await.unwrap();
        service
            .confirm_forgot_password("h@example.com", &code, "newpassword1")
            .await
            .unwrap();

        // Sessions are revoked and the code is consumed
        assert_eq!(
            service.authenticate(&old.access_token).await,
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            service.verify_reset_code("h@example.com", &code).await,
            Err(AuthError::CodeMismatch)
        );

        assert!(service.login("h@example.com", "newpassword1").await.is_ok());
        assert_eq!(
            service.login("h@example.com", "password123").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_user() {
        let service = create_service().await;
        assert_eq!(
            service.forgot_password("ghost@example.com").await,
            Err(AuthError::UserNotFound)
        );
    }

    #[tokio::test]
    async fn test_reset_code_attempt_limit() {
        let service = create_service().await;
        service.signup("i@example.com", "password123").await.unwrap();
        service.forgot_password("i@example.com").await.unwrap();
        let code = stored_reset_code(&service, "i@example.com").await;
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..MAX_RESET_ATTEMPTS {
            assert_eq!(
                service.verify_reset_code("i@example.com", wrong).await,
                Err(AuthError::CodeMismatch)
            );
        }
        assert_eq!(
            service.verify_reset_code("i@example.com", &code).await,
            Err(AuthError::LimitExceeded)
        );
    }

    #[tokio::test]
    async fn test_concurrent_reset_guesses_respect_limit() {
        let service = create_service().await;
        service.signup("p@example.com", "password123").await.unwrap();
        service.forgot_password("p@example.com").await.unwrap();
        let code = stored_reset_code(&service, "p@example.com").await;
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let guesses: Vec<_> = (0..12)
            .map(|_| {
                let service = service.clone();
                let wrong = wrong.to_string();
                tokio::spawn(async move { service.verify_reset_code("p@example.com", &wrong).await })
            })
            .collect();

        let mut mismatches = 0;
        for guess in guesses {
            match guess.await.unwrap() {
                Err(AuthError::CodeMismatch) => mismatches += 1,
                Err(AuthError::LimitExceeded) => {}
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert_eq!(mismatches, MAX_RESET_ATTEMPTS);

        let (attempts,) =
            sqlx::query_as::<_, (i64,)>("SELECT attempts FROM reset_codes WHERE email = ?")
                .bind("p@example.com")
                .fetch_one(&service.pool)
                .await
                .unwrap();
        assert_eq!(attempts, MAX_RESET_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_correct_reset_code_does_not_use_up_attempts() {
        let service = create_service().await;
        service.signup("q@example.com", "password123").await.unwrap();
        service.forgot_password("q@example.com").await.unwrap();
        let code = stored_reset_code(&service, "q@example.com").await;

        for _ in 0..MAX_RESET_ATTEMPTS + 2 {
            service.verify_reset_code("q@example.com", &code).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_expired_reset_code() {
        let service = create_service().await;
        service.signup("j@example.com", "password123").await.unwrap();
        service.forgot_password("j@example.com").await.unwrap();
        let code = stored_reset_code(&service, "j@example.com").await;

        set_reset_code_expiry(&service.pool, "j@example.com", Utc::now() - Duration::minutes(1))
            .await;

        assert_eq!(
            service.verify_reset_code("j@example.com", &code).await,
            Err(AuthError::ExpiredCode)
        );
    }

    #[tokio::test]
    async fn test_change_password() {
        let service = create_service().await;
        service.signup("k@example.com", "password123").await.unwrap();
        let tokens = service.login("k@example.com", "password123").await.unwrap();

        assert_eq!(
            service
                .change_password(&tokens.access_token, "wrong-one", "newpassword1")
                .await,
            Err(AuthError::IncorrectPassword)
        );

        service
            .change_password(&tokens.access_token, "password123", "newpassword1")
            .await
            .unwrap();

        assert_eq!(
            service.authenticate(&tokens.access_token).await,
            Err(AuthError::InvalidToken)
        );
        assert!(service.login("k@example.com", "newpassword1").await.is_ok());
    }

    #[tokio::test]
    async fn test_profile_get_and_update() {
        let service = create_service().await;
        service.signup("lena@example.com", "password123").await.unwrap();
        let tokens = service.login("lena@example.com", "password123").await.unwrap();

        let profile = service.get_user_profile(&tokens.access_token).await.unwrap();
        assert_eq!(profile.name, "lena");
        assert!(profile.email_verified);

        let updated = service
            .update_user_profile(
                &tokens.access_token,
                &ProfileUpdate {
                    name: Some("Lena Smith".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Lena Smith");

        let user = service.authenticate(&tokens.access_token).await.unwrap();
        assert_eq!(user.name, "Lena Smith");

        assert!(matches!(
            service
                .update_user_profile(
                    &tokens.access_token,
                    &ProfileUpdate {
                        name: Some("x".repeat(MAX_NAME_LEN + 1)),
                    },
                )
                .await,
            Err(AuthError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_in_memory() {
        let config = AuthConfig {
            database_url: "sqlite::memory:".to_string(),
            ..AuthConfig::default()
        };
        let service = LocalAuthService::connect(&config).await.unwrap();
        service.signup("m@example.com", "password123").await.unwrap();
        assert!(service.login("m@example.com", "password123").await.is_ok());
    }

    async fn insert_session(service: &LocalAuthService, token: &str, ttl: Duration) {
        let now = Utc::now();
        service
            .sessions
            .create_session(&Session {
                token: token.to_string(),
                user_id: UserId::new("u-1"),
                created_at: now,
                expires_at: now + ttl,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_purge_expired_sessions() {
        let service = create_service().await;
        assert_eq!(service.purge_expired_sessions().await.unwrap(), 0);
        assert_eq!(service.mode(), DeploymentMode::Local);

        insert_session(&service, "stale", Duration::hours(-1)).await;
        insert_session(&service, "live", Duration::hours(1)).await;
        assert_eq!(service.purge_expired_sessions().await.unwrap(), 1);
        assert!(service.sessions.get_session("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_background_purge_removes_expired_sessions() {
        let service = create_service().await;
        insert_session(&service, "stale", Duration::hours(-1)).await;
        insert_session(&service, "live", Duration::hours(1)).await;

        let handle = service.spawn_session_purge(std::time::Duration::from_millis(20));
        let mut purged = false;
        for _ in 0..50 {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if service.sessions.get_session("stale").await.unwrap().is_none() {
                purged = true;
                break;
            }
        }
        handle.abort();

        assert!(purged);
        assert!(service.sessions.get_session("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_huge_session_ttl_does_not_overflow() {
        let config = AuthConfig {
            session_ttl: std::time::Duration::from_secs(u64::MAX),
            ..AuthConfig::default()
        };
        let service = LocalAuthService::new(memory_pool().await, &config);
        service.migrate().await.unwrap();
        service.signup("big@example.com", "password123").await.unwrap();

        let tokens = service.login("big@example.com", "password123").await.unwrap();
        assert_eq!(tokens.expires_in, MAX_TTL_SECS as i64);
        assert!(service.authenticate(&tokens.access_token).await.is_ok());
    }
}
