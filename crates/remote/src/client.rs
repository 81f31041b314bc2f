//! HTTP plumbing shared by every repository: URL layout, credentials,
//! table reads and writes, procedure calls and error extraction.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use coachline_core::query::Table;

use crate::{
    config::RemoteConfig,
    error::{RemoteError, RemoteResult},
    postgrest::Query,
};

/// Whose authority a provisioning call runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// A signed-in user's access token; row-level policies apply.
    User(String),
    /// The privileged service key; policies are bypassed.
    Service,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Bearer<'a> {
    Anon,
    User(&'a str),
    Service,
}

impl<'a> From<&'a Credential> for Bearer<'a> {
    fn from(credential: &'a Credential) -> Self {
        match credential {
            Credential::User(token) => Bearer::User(token),
            Credential::Service => Bearer::Service,
        }
    }
}

/// Typed client for the hosted backend. Constructed once at the composition
/// root and shared behind the repository traits.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    config: RemoteConfig,
}

impl BackendClient {
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub(crate) fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url(), path)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.base_url(), path)
    }

    pub(crate) fn request(
        &self,
        method: Method,
        url: &str,
        bearer: Bearer<'_>,
    ) -> RemoteResult<RequestBuilder> {
        let anon = self.config.anon_key.as_str();
        let (apikey, token) = match bearer {
            Bearer::Anon => (anon, anon),
            Bearer::User(token) => (anon, token),
            Bearer::Service => {
                let key = self.config.service_role_key.as_deref().ok_or_else(|| {
                    RemoteError::Config("service role key is not configured".to_string())
                })?;
                (key, key)
            }
        };
        Ok(self
            .http
            .request(method, url)
            .header("apikey", apikey)
            .bearer_auth(token))
    }

    pub(crate) async fn select<T: DeserializeOwned>(
        &self,
        token: &str,
        query: &Query,
    ) -> RemoteResult<Vec<T>> {
        self.select_as(Bearer::User(token), query).await
    }

    pub(crate) async fn select_as<T: DeserializeOwned>(
        &self,
        bearer: Bearer<'_>,
        query: &Query,
    ) -> RemoteResult<Vec<T>> {
        debug!(table = query.table_name(), "select");
        let response = self
            .request(Method::GET, &self.rest_url(query.table_name()), bearer)?
            .query(&query.params())
            .send()
            .await?;
        decode(response).await
    }

    pub(crate) async fn select_one<T: DeserializeOwned>(
        &self,
        token: &str,
        query: Query,
    ) -> RemoteResult<Option<T>> {
        let rows = self.select(token, &query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    pub(crate) async fn insert<T, B>(&self, token: &str, table: Table, body: &B) -> RemoteResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(table = table.name(), "insert");
        let response = self
            .request(Method::POST, &self.rest_url(table.name()), Bearer::User(token))?
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::api(500, format!("insert into {} returned no rows", table.name())))
    }

    pub(crate) async fn update<T, B>(&self, token: &str, query: &Query, body: &B) -> RemoteResult<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.update_as(Bearer::User(token), query, body).await
    }

    pub(crate) async fn update_as<T, B>(
        &self,
        bearer: Bearer<'_>,
        query: &Query,
        body: &B,
    ) -> RemoteResult<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(table = query.table_name(), "update");
        let response = self
            .request(Method::PATCH, &self.rest_url(query.table_name()), bearer)?
            .header("Prefer", "return=representation")
            .query(&query.filter_params())
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    pub(crate) async fn delete(&self, token: &str, query: &Query) -> RemoteResult<()> {
        debug!(table = query.table_name(), "delete");
        let response = self
            .request(Method::DELETE, &self.rest_url(query.table_name()), Bearer::User(token))?
            .query(&query.filter_params())
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    pub(crate) async fn rpc<T, A>(&self, bearer: Bearer<'_>, name: &str, args: &A) -> RemoteResult<T>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        debug!(procedure = name, "rpc");
        let response = self
            .request(Method::POST, &self.rest_url(&format!("rpc/{}", name)), bearer)?
            .json(args)
            .send()
            .await?;
        decode(response).await
    }

    /// Calls a procedure whose result is ignored; `void` functions answer
    /// with an empty body.
    pub(crate) async fn rpc_void<A>(&self, bearer: Bearer<'_>, name: &str, args: &A) -> RemoteResult<()>
    where
        A: Serialize + ?Sized,
    {
        debug!(procedure = name, "rpc");
        let response = self
            .request(Method::POST, &self.rest_url(&format!("rpc/{}", name)), bearer)?
            .json(args)
            .send()
            .await?;
        check(response).await.map(|_| ())
    }
}

pub(crate) async fn check(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = api_error(status, &body);
    warn!(status = status.as_u16(), error = %err, "backend call failed");
    Err(err)
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let response = check(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pulls the human-readable message out of an error body. The REST layer
/// uses `message`, the auth API uses `msg`, `error_description` or `error`.
pub(crate) fn api_error(status: StatusCode, body: &str) -> RemoteError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|m| m.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                trimmed.to_string()
            }
        });
    let code = parsed.and_then(|value| {
        value.get("code").map(|code| match code {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    });
    RemoteError::Api {
        status: status.as_u16(),
        message,
        code,
    }
}
