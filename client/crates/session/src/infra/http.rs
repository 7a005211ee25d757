//! HTTP Profile Gateway
//!
//! `reqwest` implementation of [`ProfileGateway`]. These requests bypass the
//! auth gate: a 401 from the wrong role's endpoint is an expected answer
//! during resolution, not a reason to log out.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};

use crate::application::config::SessionConfig;
use crate::domain::entity::profile::Profile;
use crate::domain::gateway::ProfileGateway;
use crate::domain::value_object::{credential::Credential, role::Role};
use crate::error::{ApiError, SessionError, SessionResult};

/// Build the HTTP client shared by the gateway and the API client
#[cfg_attr(target_arch = "wasm32", allow(unused_variables))]
pub(crate) fn build_client(config: &SessionConfig) -> SessionResult<Client> {
    let builder = Client::builder();
    // The fetch API has no per-request timeout.
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(config.request_timeout);
    builder
        .build()
        .map_err(|e| SessionError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Send the browser's cookies along with cross-origin requests
pub(crate) fn with_browser_credentials(request: RequestBuilder) -> RequestBuilder {
    #[cfg(target_arch = "wasm32")]
    let request = request.fetch_credentials_include();
    request
}

/// Map a non-success status to [`ApiError::Status`]
pub(crate) fn check_status(path: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::status(path, status.as_u16()))
    }
}

/// Identity endpoints over HTTP
#[derive(Clone)]
pub struct HttpProfileGateway {
    http: Client,
    config: Arc<SessionConfig>,
}

impl HttpProfileGateway {
    pub fn new(config: &SessionConfig) -> SessionResult<Self> {
        Ok(Self {
            http: build_client(config)?,
            config: Arc::new(config.clone()),
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        credential: &Credential,
    ) -> Result<Response, ApiError> {
        let url = self
            .config
            .endpoint(path)
            .map_err(|e| ApiError::invalid_request(path, e.to_string()))?;

        let request = self
            .http
            .request(method, url)
            .bearer_auth(credential.as_str());
        let response = with_browser_credentials(request)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(path, e))?;

        check_status(path, response)
    }
}

fn endpoint_for(role: Role, path: Option<&'static str>) -> Result<&'static str, ApiError> {
    path.ok_or_else(|| ApiError::invalid_request(role.code(), "role has no endpoint"))
}

impl ProfileGateway for HttpProfileGateway {
    async fn fetch_profile(&self, role: Role, credential: &Credential) -> Result<Profile, ApiError> {
        let path = endpoint_for(role, role.profile_path())?;
        let response = self.send(Method::GET, path, credential).await?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::invalid_body(path, e.to_string()))?;

        Profile::from_value(body)
            .ok_or_else(|| ApiError::invalid_body(path, "expected a non-empty JSON object"))
    }

    async fn logout(&self, role: Role, credential: &Credential) -> Result<(), ApiError> {
        let path = endpoint_for(role, role.logout_path())?;
        self.send(Method::POST, path, credential).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_server::{Route, serve};

    fn gateway(base_url: &str) -> HttpProfileGateway {
        let config = SessionConfig::for_origin(base_url, false).unwrap();
        HttpProfileGateway::new(&config).unwrap()
    }

    fn token() -> Credential {
        Credential::parse("tok-1").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_profile_sends_bearer() {
        let server = serve(vec![Route::new(
            "GET /api/students/profile",
            200,
            r#"{"name":"Asha"}"#,
        )])
        .await;

        let profile = gateway(&server.base_url)
            .fetch_profile(Role::Student, &token())
            .await
            .unwrap();

        assert_eq!(profile.get("name"), Some(&serde_json::json!("Asha")));
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].to_ascii_lowercase().contains("authorization: bearer tok-1"));
    }

    #[tokio::test]
    async fn test_fetch_profile_status_errors() {
        let server = serve(vec![
            Route::new("GET /api/students/profile", 401, "{}"),
            Route::new("GET /api/institutes/profile", 503, "{}"),
        ])
        .await;
        let gateway = gateway(&server.base_url);

        let err = gateway.fetch_profile(Role::Student, &token()).await.unwrap_err();
        assert!(err.is_authorization_failure());
        assert_eq!(err.path(), "/api/students/profile");

        let err = gateway.fetch_profile(Role::Institute, &token()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unusable_body_is_invalid() {
        let server = serve(vec![
            Route::new("GET /api/students/profile", 200, "[]"),
            Route::new("GET /api/institutes/profile", 200, "not json"),
        ])
        .await;
        let gateway = gateway(&server.base_url);

        for role in Role::PROBE_ORDER {
            let err = gateway.fetch_profile(role, &token()).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidBody { .. }), "{role}: {err}");
        }
    }

    #[tokio::test]
    async fn test_logout_posts_to_role_endpoint() {
        let server = serve(vec![Route::new("POST /api/institutes/logout", 200, "{}")]).await;

        gateway(&server.base_url)
            .logout(Role::Institute, &token())
            .await
            .unwrap();

        assert!(server.requests()[0].starts_with("POST /api/institutes/logout"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        // Nothing listens on the discard port.
        let err = gateway("http://127.0.0.1:9")
            .fetch_profile(Role::Student, &token())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_anonymous_has_no_endpoint() {
        let err = gateway("http://127.0.0.1:9")
            .fetch_profile(Role::Anonymous, &token())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest { .. }));
    }
}
