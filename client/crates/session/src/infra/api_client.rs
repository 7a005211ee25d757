//! API Client
//!
//! The one request executor application pages share. Attaches the current
//! credential, decodes JSON and passes every outcome through the
//! [`AuthGate`], so an authorization failure on any call ends the session.

use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::application::auth_gate::{AuthGate, SessionHandle};
use crate::application::config::SessionConfig;
use crate::error::{ApiError, SessionResult};
use crate::infra::http::{build_client, check_status, with_browser_credentials};

pub struct ApiClient<H>
where
    H: SessionHandle,
{
    http: Client,
    config: SessionConfig,
    gate: AuthGate<H>,
}

impl<H> ApiClient<H>
where
    H: SessionHandle + Sync,
{
    pub fn new(config: &SessionConfig, session: H) -> SessionResult<Self> {
        Ok(Self {
            http: build_client(config)?,
            config: config.clone(),
            gate: AuthGate::new(session, config),
        })
    }

    pub fn gate(&self) -> &AuthGate<H> {
        &self.gate
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.json(Method::GET, path, None).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(path, body)?;
        self.json(Method::POST, path, Some(body)).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(path, body)?;
        self.json(Method::PATCH, path, Some(body)).await
    }

    /// DELETE; the response body is ignored
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let result = self.send(Method::DELETE, path, None).await.map(drop);
        self.gate.observe(path, result).await
    }

    async fn json<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let result = match self.send(method, path, body).await {
            Ok(response) => response
                .json::<T>()
                .await
                .map_err(|e| ApiError::invalid_body(path, e.to_string())),
            Err(e) => Err(e),
        };
        self.gate.observe(path, result).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let url = self
            .config
            .endpoint(path)
            .map_err(|e| ApiError::invalid_request(path, e.to_string()))?;

        let mut request = with_browser_credentials(self.http.request(method, url));
        if let Some(credential) = self.gate.credential() {
            request = request.bearer_auth(credential.as_str());
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(path, e))?;
        check_status(path, response)
    }
}

fn encode<B>(path: &str, body: &B) -> Result<serde_json::Value, ApiError>
where
    B: Serialize + ?Sized,
{
    serde_json::to_value(body).map_err(|e| ApiError::invalid_request(path, e.to_string()))
}
