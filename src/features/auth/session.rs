//! Auth session scoped to one run of the front end. The session owns the API
//! client and the token store: it loads the persisted token on start, hydrates
//! the profile from `/auth/me`, and tears itself down on logout or when the
//! backend rejects the token. Views borrow it instead of reaching for a
//! global.

use crate::{
    api::{ApiClient, ApiError},
    features::auth::{client, code::VerificationCode, token_store::TokenStore, types::UserProfile},
    routes::Route,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

/// Detail the backend returns when credentials are right but the email is
/// still unverified.
pub const NOT_VERIFIED_DETAIL: &str = "not_verified";

/// Result of a login attempt that did not fail outright.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(Route),
    NeedsVerification(Route),
}

impl LoginOutcome {
    #[must_use]
    pub const fn route(&self) -> &Route {
        match self {
            Self::Authenticated(route) | Self::NeedsVerification(route) => route,
        }
    }
}

pub struct Session<S: TokenStore> {
    api: ApiClient,
    store: S,
    user: Option<UserProfile>,
}

impl<S: TokenStore> Session<S> {
    /// Creates the session and adopts any persisted token. The profile is
    /// not fetched until [`Session::refresh_user`] runs.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the token store cannot be read.
    pub fn start(mut api: ApiClient, store: S) -> Result<Self, ApiError> {
        let token = store.load()?;
        if token.is_some() {
            debug!("restored persisted token");
        }
        api.set_token(token);

        Ok(Self {
            api,
            store,
            user: None,
        })
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.api.has_token()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.is_admin)
    }

    /// Refreshes the profile for the current token. Without a token this is
    /// a no-op. A rejected token tears the session down and yields `None`;
    /// transport errors leave the session intact and are returned.
    ///
    /// # Errors
    /// Returns the underlying `ApiError` for failures other than an
    /// authentication rejection.
    pub async fn refresh_user(&mut self) -> Result<Option<&UserProfile>, ApiError> {
        if !self.api.has_token() {
            self.user = None;
            return Ok(None);
        }

        match client::fetch_me(&self.api).await {
            Ok(profile) => {
                self.user = Some(profile);
                Ok(self.user.as_ref())
            }
            Err(err) if err.is_unauthorized() => {
                warn!("stored token rejected, clearing session");
                self.teardown()?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// The token is already stored at this point, so a failed profile fetch
    /// leaves the user signed in and the next command retries it.
    async fn refresh_after_sign_in(&mut self) {
        if let Err(err) = self.refresh_user().await {
            warn!(error = %err, "signed in but the profile could not be loaded");
        }
    }

    /// Registers a pending account and routes to code verification.
    ///
    /// # Errors
    /// Returns the `ApiError` from the backend, e.g. 409 for a known email.
    pub async fn register(&self, email: &str) -> Result<Route, ApiError> {
        client::register(&self.api, email).await?;
        info!("registration pending verification");
        Ok(Route::Verify {
            email: email.to_string(),
        })
    }

    /// Submits a verification code. On success the returned token is
    /// persisted, the profile refreshed and the dashboard is next.
    ///
    /// # Errors
    /// Returns the backend error (invalid or expired code) or a storage
    /// error if the token cannot be persisted.
    pub async fn verify(&mut self, email: &str, code: &VerificationCode) -> Result<Route, ApiError> {
        let response = client::verify(&self.api, email, code.as_str()).await?;
        self.adopt_token(SecretString::from(response.access_token))?;
        self.refresh_after_sign_in().await;
        Ok(Route::Dashboard)
    }

    /// Requests a fresh verification code.
    ///
    /// # Errors
    /// Returns the `ApiError` from the backend.
    pub async fn resend_code(&self, email: &str) -> Result<(), ApiError> {
        client::resend_code(&self.api, email).await
    }

    /// Logs in. An unverified account is not an error: the outcome routes to
    /// the verification view for that email.
    ///
    /// # Errors
    /// Returns the backend error for bad credentials or a disabled account,
    /// or a storage error if the token cannot be persisted.
    pub async fn login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, ApiError> {
        match client::login(&self.api, email, password).await {
            Ok(response) => {
                self.adopt_token(SecretString::from(response.access_token))?;
                self.refresh_after_sign_in().await;
                info!("logged in");
                Ok(LoginOutcome::Authenticated(Route::Dashboard))
            }
            Err(err) if err.detail() == Some(NOT_VERIFIED_DETAIL) => {
                Ok(LoginOutcome::NeedsVerification(Route::Verify {
                    email: email.to_string(),
                }))
            }
            Err(err) => Err(err),
        }
    }

    /// Triggers a password reset email.
    ///
    /// # Errors
    /// Returns the `ApiError` from the backend.
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        client::forgot_password(&self.api, email).await
    }

    /// Ends the session locally. The backend keeps no session state for
    /// bearer tokens, so there is nothing to call.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the persisted token cannot be removed.
    pub fn logout(&mut self) -> Result<Route, ApiError> {
        self.teardown()?;
        info!("logged out");
        Ok(Route::Login)
    }

    /// Guard for signed-in views.
    ///
    /// # Errors
    /// Returns the login route when no profile is loaded.
    pub fn require_user(&self) -> Result<&UserProfile, Route> {
        self.user.as_ref().ok_or(Route::Login)
    }

    /// Guard for the admin view. Access control is the API's job; this only
    /// keeps non-admins away from a page that would fail anyway.
    ///
    /// # Errors
    /// Returns the login route without a profile and the dashboard for
    /// non-admin users.
    pub fn require_admin(&self) -> Result<&UserProfile, Route> {
        let user = self.require_user()?;
        if user.is_admin {
            Ok(user)
        } else {
            Err(Route::Dashboard)
        }
    }

    fn adopt_token(&mut self, token: SecretString) -> Result<(), ApiError> {
        self.store.save(&token)?;
        self.api.set_token(Some(token));
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), ApiError> {
        self.api.set_token(None);
        self.user = None;
        self.store.clear()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::auth::token_store::MemoryTokenStore;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile_json(is_admin: bool) -> serde_json::Value {
        json!({
            "id": "7d8f6c2e-35a8-4a7e-9a55-0d1b8f8e1c11",
            "email": "jo@example.com",
            "is_admin": is_admin,
            "is_beta_tester": true,
            "max_tunnels": 5,
            "tunnel_count": 1
        })
    }

    fn session(server: &MockServer, store: MemoryTokenStore) -> Session<MemoryTokenStore> {
        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();
        Session::start(api, store).unwrap()
    }

    #[tokio::test]
    async fn verify_stores_server_token_and_routes_to_dashboard() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify"))
            .and(body_json(json!({ "email": "jo@example.com", "code": "123456" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "tok-1", "token_type": "bearer" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json(false)))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = session(&server, MemoryTokenStore::default());
        let code = VerificationCode::parse("123456").unwrap();
        let route = session.verify("jo@example.com", &code).await.unwrap();

        assert_eq!(route, Route::Dashboard);
        assert_eq!(session.store.load().unwrap().unwrap().expose_secret(), "tok-1");
        assert_eq!(session.user().map(|u| u.email.as_str()), Some("jo@example.com"));
    }

    #[tokio::test]
    async fn verify_succeeds_when_profile_fetch_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "tok-1", "token_type": "bearer" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = session(&server, MemoryTokenStore::default());
        let code = VerificationCode::parse("123456").unwrap();
        let route = session.verify("jo@example.com", &code).await.unwrap();

        assert_eq!(route, Route::Dashboard);
        assert!(session.has_token());
        assert!(session.user().is_none());
        assert_eq!(session.store.load().unwrap().unwrap().expose_secret(), "tok-1");
    }

    #[tokio::test]
    async fn failed_verify_keeps_session_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "detail": "Invalid verification code" })),
            )
            .mount(&server)
            .await;

        let mut session = session(&server, MemoryTokenStore::default());
        let code = VerificationCode::parse("000000").unwrap();
        let err = session.verify("jo@example.com", &code).await.unwrap_err();

        assert_eq!(err.user_message("Invalid code"), "Invalid verification code");
        assert!(!session.has_token());
        assert!(session.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn unverified_login_routes_to_verify() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "detail": "not_verified" })))
            .mount(&server)
            .await;

        let mut session = session(&server, MemoryTokenStore::default());
        let password = SecretString::from("pw".to_string());
        let outcome = session.login("jo@example.com", &password).await.unwrap();

        assert_eq!(
            outcome,
            LoginOutcome::NeedsVerification(Route::Verify {
                email: "jo@example.com".to_string()
            })
        );
        assert!(!session.has_token());
    }

    #[tokio::test]
    async fn login_persists_token_and_loads_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "email": "jo@example.com", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok-2" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json(true)))
            .mount(&server)
            .await;

        let mut session = session(&server, MemoryTokenStore::default());
        let password = SecretString::from("pw".to_string());
        let outcome = session.login("jo@example.com", &password).await.unwrap();

        assert_eq!(outcome.route(), &Route::Dashboard);
        assert!(session.is_admin());
        assert!(session.require_admin().is_ok());
    }

    #[tokio::test]
    async fn bad_credentials_surface_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "detail": "Email ou mot de passe incorrect" })),
            )
            .mount(&server)
            .await;

        let mut session = session(&server, MemoryTokenStore::default());
        let password = SecretString::from("nope".to_string());
        let err = session.login("jo@example.com", &password).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.detail(), Some("Email ou mot de passe incorrect"));
    }

    #[tokio::test]
    async fn rejected_token_tears_session_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid or expired token" })),
            )
            .mount(&server)
            .await;

        let store = MemoryTokenStore::with_token("stale");
        let mut session = session(&server, store);
        assert!(session.has_token());

        let user = session.refresh_user().await.unwrap();
        assert!(user.is_none());
        assert!(!session.has_token());
        assert!(session.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn refresh_without_token_skips_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json(false)))
            .expect(0)
            .mount(&server)
            .await;

        let mut session = session(&server, MemoryTokenStore::default());
        assert!(session.refresh_user().await.unwrap().is_none());
        assert_eq!(session.require_user().unwrap_err(), Route::Login);
    }

    #[tokio::test]
    async fn non_admin_is_sent_to_dashboard() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json(false)))
            .mount(&server)
            .await;

        let mut session = session(&server, MemoryTokenStore::with_token("tok"));
        session.refresh_user().await.unwrap();
        assert_eq!(session.require_admin().unwrap_err(), Route::Dashboard);
    }

    #[tokio::test]
    async fn logout_clears_token_and_profile() {
        let server = MockServer::start().await;
        let mut session = session(&server, MemoryTokenStore::with_token("tok"));

        assert_eq!(session.logout().unwrap(), Route::Login);
        assert!(!session.has_token());
        assert!(session.user().is_none());
        assert!(session.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn register_routes_to_verify() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({ "email": "new@example.com" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "7d8f6c2e-35a8-4a7e-9a55-0d1b8f8e1c11",
                "email": "new@example.com",
                "created_at": "2026-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = session(&server, MemoryTokenStore::default());
        let route = session.register("new@example.com").await.unwrap();
        assert_eq!(
            route,
            Route::Verify {
                email: "new@example.com".to_string()
            }
        );
    }
}
