//! Calls against the hosted auth provider.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use coachline_core::models::auth::{AuthUser, Session, SignUpOutcome, UserMetadata};

use crate::{
    client::{BackendClient, Bearer, check, decode},
    error::RemoteResult,
};

#[automock]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        redirect_to: &str,
    ) -> RemoteResult<SignUpOutcome>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> RemoteResult<Session>;

    /// URL the browser is sent to for an OAuth sign-in with `provider`.
    fn oauth_authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String;

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> RemoteResult<Session>;

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> RemoteResult<()>;

    async fn update_password(&self, token: &str, password: &str) -> RemoteResult<AuthUser>;

    async fn get_user(&self, token: &str) -> RemoteResult<AuthUser>;

    async fn update_user_metadata(&self, token: &str, metadata: &UserMetadata) -> RemoteResult<AuthUser>;

    async fn sign_out(&self, token: &str) -> RemoteResult<()>;

    /// Creates a confirmed user with the service key.
    async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> RemoteResult<AuthUser>;
}

/// The signup endpoint answers with a session when it signs the user in
/// immediately, or with the bare user while email confirmation is pending.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(Session),
    Wrapped { user: AuthUser },
    User(AuthUser),
}

#[async_trait]
impl AuthApi for BackendClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        redirect_to: &str,
    ) -> RemoteResult<SignUpOutcome> {
        debug!(email, "sign up");
        let response = self
            .request(Method::POST, &self.auth_url("signup"), Bearer::Anon)?
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;
        let outcome = match decode::<SignUpBody>(response).await? {
            SignUpBody::Session(session) => SignUpOutcome::SignedIn(session),
            SignUpBody::Wrapped { user } | SignUpBody::User(user) => {
                info!(user_id = %user.id, "sign up awaiting email confirmation");
                SignUpOutcome::ConfirmationSent(user)
            }
        };
        Ok(outcome)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> RemoteResult<Session> {
        debug!(email, "password sign in");
        let response = self
            .request(Method::POST, &self.auth_url("token"), Bearer::Anon)?
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        decode(response).await
    }

    fn oauth_authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String {
        format!(
            "{}?provider={}&redirect_to={}&code_challenge={}&code_challenge_method=plain",
            self.auth_url("authorize"),
            urlencoding::encode(provider),
            urlencoding::encode(redirect_to),
            urlencoding::encode(code_challenge),
        )
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> RemoteResult<Session> {
        let response = self
            .request(Method::POST, &self.auth_url("token"), Bearer::Anon)?
            .query(&[("grant_type", "pkce")])
            .json(&json!({ "auth_code": code, "code_verifier": code_verifier }))
            .send()
            .await?;
        decode(response).await
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> RemoteResult<()> {
        let response = self
            .request(Method::POST, &self.auth_url("recover"), Bearer::Anon)?
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    async fn update_password(&self, token: &str, password: &str) -> RemoteResult<AuthUser> {
        let response = self
            .request(Method::PUT, &self.auth_url("user"), Bearer::User(token))?
            .json(&json!({ "password": password }))
            .send()
            .await?;
        decode(response).await
    }

    async fn get_user(&self, token: &str) -> RemoteResult<AuthUser> {
        let response = self
            .request(Method::GET, &self.auth_url("user"), Bearer::User(token))?
            .send()
            .await?;
        decode(response).await
    }

    async fn update_user_metadata(&self, token: &str, metadata: &UserMetadata) -> RemoteResult<AuthUser> {
        let response = self
            .request(Method::PUT, &self.auth_url("user"), Bearer::User(token))?
            .json(&json!({ "data": metadata }))
            .send()
            .await?;
        decode(response).await
    }

    async fn sign_out(&self, token: &str) -> RemoteResult<()> {
        let response = self
            .request(Method::POST, &self.auth_url("logout"), Bearer::User(token))?
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> RemoteResult<AuthUser> {
        info!(email, "provisioning user with service key");
        let response = self
            .request(Method::POST, &self.auth_url("admin/users"), Bearer::Service)?
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
                "user_metadata": metadata,
            }))
            .send()
            .await?;
        decode(response).await
    }
}
