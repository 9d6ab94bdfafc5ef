//! Splunk management API client implementation.
//!
//! This module provides the HTTP client for the Splunk REST endpoints under
//! `/services/data/indexes`. It implements [`IndexAccessor`] and performs no
//! retries: a failed call is returned to the caller as-is.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::config::{ConnectionParameters, SplunkVersion};
use crate::error::{ConnectionError, ResourceStateError, Result, SplunkIndexError};

use super::accessor::IndexAccessor;
use super::types::{ActualState, Feed, LoginResponse, MessagesBody, TOTAL_EVENT_COUNT_KEY};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How long a clean may wait for the index to drain.
const DEFAULT_CLEAN_TIMEOUT_SECS: u64 = 60;

/// Delay between event-count polls while cleaning.
const CLEAN_POLL_INTERVAL_MS: u64 = 1000;

/// Global index collection path.
const INDEXES_PATH: &str = "services/data/indexes";

/// Attributes lowered to drain an index during a clean.
const DRAIN_ATTRIBUTES: [&str; 2] = ["maxTotalDataSizeMB", "frozenTimePeriodInSecs"];

/// Splunk releases before this major version must disable an index to clean it.
const CLEAN_WITHOUT_DISABLE_SINCE: u32 = 5;

/// Splunk management API client.
#[derive(Debug, Clone)]
pub struct SplunkClient {
    /// HTTP client.
    client: Client,
    /// Base URL, e.g. `https://localhost:8089`.
    base_url: String,
    /// Session key returned by the login endpoint.
    session_key: String,
    /// Target Splunk version.
    version: SplunkVersion,
    /// Maximum time a clean waits for the index to drain.
    clean_timeout: Duration,
    /// Delay between drain polls.
    poll_interval: Duration,
}

impl SplunkClient {
    /// Connects and authenticates against the management API.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if the server cannot be reached or the
    /// credentials are refused.
    pub async fn connect(params: &ConnectionParameters) -> Result<Self> {
        Self::connect_with_timeout(params, DEFAULT_TIMEOUT_SECS).await
    }

    /// Connects with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] if the server cannot be reached or the
    /// credentials are refused.
    pub async fn connect_with_timeout(
        params: &ConnectionParameters,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(!params.verify_tls)
            .build()
            .map_err(|e| ConnectionError::network(format!("Failed to create HTTP client: {e}")))?;

        let base_url = params.base_url();
        info!("Connecting to Splunk {} at {base_url}", params.version);

        let session_key =
            Self::login(&client, &base_url, &params.username, &params.password).await?;

        Ok(Self {
            client,
            base_url,
            session_key,
            version: params.version,
            clean_timeout: Duration::from_secs(DEFAULT_CLEAN_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(CLEAN_POLL_INTERVAL_MS),
        })
    }

    /// Sets how long a clean waits for the index to drain.
    #[must_use]
    pub const fn with_clean_timeout(mut self, timeout: Duration) -> Self {
        self.clean_timeout = timeout;
        self
    }

    /// Sets the delay between drain polls.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Exchanges credentials for a session key.
    async fn login(client: &Client, base_url: &str, username: &str, password: &str) -> Result<String> {
        let url = format!("{base_url}/services/auth/login");
        debug!("Authenticating as {username}");

        let response = client
            .post(&url)
            .query(&[("output_mode", "json")])
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| ConnectionError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectionError::AuthenticationFailed {
                message: format!("{status}: {}", error_message(&body)),
            }
            .into());
        }

        let login: LoginResponse = response.json().await.map_err(|e| {
            ConnectionError::invalid_response(format!("Failed to parse login response: {e}"))
        })?;

        Ok(login.session_key)
    }

    /// URL of the index collection, optionally scoped to an app namespace.
    fn collection_url(&self, app: Option<&str>) -> String {
        app.map_or_else(
            || format!("{}/{INDEXES_PATH}", self.base_url),
            |app| format!("{}/servicesNS/nobody/{app}/data/indexes", self.base_url),
        )
    }

    /// URL of a single index entity.
    fn index_url(&self, name: &str) -> String {
        format!("{}/{INDEXES_PATH}/{name}", self.base_url)
    }

    /// Adds authentication and output mode, then sends the request.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request
            .header(header::AUTHORIZATION, format!("Splunk {}", self.session_key))
            .query(&[("output_mode", "json")]);

        let response = request.send().await.map_err(|e| {
            SplunkIndexError::Connection(ConnectionError::network(format!("Request failed: {e}")))
        })?;

        trace!("{} {}", response.status(), response.url());
        Ok(response)
    }

    /// Maps a non-success response to the matching error.
    async fn ensure_success(response: Response, index: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ConnectionError::AuthenticationFailed { message }.into()
            }
            StatusCode::NOT_FOUND => ResourceStateError::NotFound {
                index: index.to_string(),
            }
            .into(),
            _ => ResourceStateError::rejected(status.as_u16(), message).into(),
        })
    }

    /// Posts a form to an index endpoint.
    async fn post_form(&self, url: &str, index: &str, form: &[(&str, &str)]) -> Result<()> {
        let response = self.send(self.client.post(url).form(form)).await?;
        Self::ensure_success(response, index).await?;
        Ok(())
    }

    /// Forces hot buckets to roll so their data can be frozen.
    async fn roll_hot_buckets(&self, name: &str) -> Result<()> {
        debug!("Rolling hot buckets of index {name}");
        let url = format!("{}/roll-hot-buckets", self.index_url(name));
        self.post_form(&url, name, &[]).await
    }

    /// Shrinks the index to nothing and waits until it holds no events.
    async fn drain(&self, name: &str) -> Result<()> {
        let shrink: BTreeMap<String, String> = DRAIN_ATTRIBUTES
            .iter()
            .map(|k| ((*k).to_string(), String::from("1")))
            .collect();
        self.update(name, &shrink).await?;
        self.roll_hot_buckets(name).await?;

        let deadline = tokio::time::Instant::now() + self.clean_timeout;
        loop {
            let state = self.fetch_attributes(name).await?;
            if state.get(TOTAL_EVENT_COUNT_KEY) == Some("0") {
                debug!("Index {name} is empty");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ResourceStateError::CleanTimedOut {
                    index: name.to_string(),
                    timeout_secs: self.clean_timeout.as_secs(),
                }
                .into());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl IndexAccessor for SplunkClient {
    async fn exists(&self, name: &str) -> Result<bool> {
        let response = self.send(self.client.get(self.index_url(name))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Index {name} does not exist");
            return Ok(false);
        }
        Self::ensure_success(response, name).await?;
        debug!("Index {name} exists");
        Ok(true)
    }

    async fn fetch_attributes(&self, name: &str) -> Result<ActualState> {
        let response = self.send(self.client.get(self.index_url(name))).await?;
        let response = Self::ensure_success(response, name).await?;

        let feed: Feed = response.json().await.map_err(|e| {
            ConnectionError::invalid_response(format!("Failed to parse index {name}: {e}"))
        })?;

        let entry = feed.entry.into_iter().next().ok_or_else(|| {
            SplunkIndexError::ResourceState(ResourceStateError::NotFound {
                index: name.to_string(),
            })
        })?;

        Ok(ActualState::from_content(&entry.content))
    }

    async fn create(&self, name: &str, attributes: &BTreeMap<String, String>) -> Result<()> {
        let app = attributes.get("app").map(String::as_str);
        let mut form: Vec<(&str, &str)> = vec![("name", name)];
        form.extend(
            attributes
                .iter()
                .filter(|(k, _)| k.as_str() != "app")
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        info!("Creating index: {name}");
        self.post_form(&self.collection_url(app), name, &form).await
    }

    async fn update(&self, name: &str, attributes: &BTreeMap<String, String>) -> Result<()> {
        let form: Vec<(&str, &str)> = attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        info!("Updating index {name}: {} attributes", form.len());
        self.post_form(&self.index_url(name), name, &form).await
    }

    async fn enable(&self, name: &str) -> Result<()> {
        info!("Enabling index: {name}");
        let url = format!("{}/enable", self.index_url(name));
        self.post_form(&url, name, &[]).await
    }

    async fn disable(&self, name: &str) -> Result<()> {
        info!("Disabling index: {name}");
        let url = format!("{}/disable", self.index_url(name));
        self.post_form(&url, name, &[]).await
    }

    async fn clean(&self, name: &str) -> Result<()> {
        warn!("Cleaning index {name}: all data will be discarded");

        let original = self.fetch_attributes(name).await?;
        let restore: BTreeMap<String, String> = DRAIN_ATTRIBUTES
            .iter()
            .filter_map(|k| original.get(k).map(|v| ((*k).to_string(), v.to_string())))
            .collect();

        let toggled = !original.disabled() && self.version.major < CLEAN_WITHOUT_DISABLE_SINCE;
        if toggled {
            self.disable(name).await?;
        }

        let drained = self.drain(name).await;

        // Original limits are restored even when draining failed.
        let restored = if restore.is_empty() {
            Ok(())
        } else {
            self.update(name, &restore).await
        };
        let reenabled = if toggled {
            self.enable(name).await
        } else {
            Ok(())
        };

        drained.and(restored).and(reenabled)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        info!("Deleting index: {name}");
        let response = self.send(self.client.delete(self.index_url(name))).await?;
        Self::ensure_success(response, name).await?;
        Ok(())
    }
}

/// Extracts the human-readable text from an API error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<MessagesBody>(body)
        .ok()
        .map(|b| {
            b.messages
                .into_iter()
                .map(|m| m.text)
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scheme;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SESSION_KEY: &str = "abc123";

    fn connection_params(server: &MockServer, version: &str) -> ConnectionParameters {
        ConnectionParameters {
            host: server.address().ip().to_string(),
            port: server.address().port(),
            username: String::from("admin"),
            password: String::from("changeme"),
            scheme: Scheme::Http,
            version: version.parse().expect("valid version"),
            verify_tls: false,
        }
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/services/auth/login"))
            .and(body_string_contains("username=admin"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "sessionKey": SESSION_KEY })),
            )
            .mount(server)
            .await;
    }

    async fn connected_client(server: &MockServer) -> SplunkClient {
        mount_login(server).await;
        SplunkClient::connect(&connection_params(server, "8.1.0"))
            .await
            .expect("login should succeed")
    }

    fn index_body(content: serde_json::Value) -> serde_json::Value {
        json!({ "entry": [{ "name": "web", "content": content }] })
    }

    #[tokio::test]
    async fn test_login_failure_is_connection_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "messages": [{ "type": "WARN", "text": "Login failed" }]
            })))
            .mount(&server)
            .await;

        let err = SplunkClient::connect(&connection_params(&server, "8.1.0"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SplunkIndexError::Connection(ConnectionError::AuthenticationFailed { ref message })
                if message.contains("Login failed")
        ));
    }

    #[tokio::test]
    async fn test_exists() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/services/data/indexes/web"))
            .and(header("Authorization", "Splunk abc123"))
            .and(query_param("output_mode", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(index_body(json!({}))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/data/indexes/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client.exists("web").await.unwrap());
        assert!(!client.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_attributes() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/services/data/indexes/web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(index_body(json!({
                "maxTotalDataSizeMB": 800,
                "frozenTimePeriodInSecs": "3600",
                "disabled": true,
            }))))
            .mount(&server)
            .await;

        let state = client.fetch_attributes("web").await.unwrap();
        assert_eq!(state.get("maxTotalDataSizeMB"), Some("800"));
        assert_eq!(state.get("frozenTimePeriodInSecs"), Some("3600"));
        assert!(state.disabled());
    }

    #[tokio::test]
    async fn test_fetch_missing_index_is_not_found() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/services/data/indexes/web"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client.fetch_attributes("web").await.unwrap_err();
        assert!(matches!(
            err,
            SplunkIndexError::ResourceState(ResourceStateError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_in_app_namespace() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/servicesNS/nobody/search/data/indexes"))
            .and(body_string_contains("name=web"))
            .and(body_string_contains("homePath=%2Fa"))
            .respond_with(ResponseTemplate::new(201).set_body_json(index_body(json!({}))))
            .expect(1)
            .mount(&server)
            .await;

        let attributes = BTreeMap::from([
            (String::from("homePath"), String::from("/a")),
            (String::from("app"), String::from("search")),
        ]);
        client.create("web", &attributes).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_rejected() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/services/data/indexes/web"))
            .and(body_string_contains("frozenTimePeriodInSecs=7200"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "messages": [{ "type": "ERROR", "text": "Invalid value" }]
            })))
            .mount(&server)
            .await;

        let attributes = BTreeMap::from([(
            String::from("frozenTimePeriodInSecs"),
            String::from("7200"),
        )]);
        let err = client.update("web", &attributes).await.unwrap_err();
        assert!(matches!(
            err,
            SplunkIndexError::ResourceState(ResourceStateError::Rejected { status: 400, ref message })
                if message == "Invalid value"
        ));
    }

    #[tokio::test]
    async fn test_toggle_and_delete_endpoints() {
        let server = MockServer::start().await;
        let client = connected_client(&server).await;

        for endpoint in ["enable", "disable"] {
            Mock::given(method("POST"))
                .and(path(format!("/services/data/indexes/web/{endpoint}")))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("DELETE"))
            .and(path("/services/data/indexes/web"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client.enable("web").await.unwrap();
        client.disable("web").await.unwrap();
        client.delete("web").await.unwrap();
    }

    #[tokio::test]
    async fn test_clean_drains_and_restores() {
        let server = MockServer::start().await;
        let client = connected_client(&server)
            .await
            .with_poll_interval(Duration::from_millis(10));

        Mock::given(method("GET"))
            .and(path("/services/data/indexes/web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(index_body(json!({
                "maxTotalDataSizeMB": 800,
                "frozenTimePeriodInSecs": 3600,
                "totalEventCount": 0,
                "disabled": false,
            }))))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/services/data/indexes/web"))
            .and(body_string_contains("maxTotalDataSizeMB=1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/services/data/indexes/web/roll-hot-buckets"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/services/data/indexes/web"))
            .and(body_string_contains("maxTotalDataSizeMB=800"))
            .and(body_string_contains("frozenTimePeriodInSecs=3600"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/services/data/indexes/web/disable"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        client.clean("web").await.unwrap();
    }

    #[tokio::test]
    async fn test_clean_timeout_still_restores() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        let client = SplunkClient::connect(&connection_params(&server, "4.3.0"))
            .await
            .unwrap()
            .with_clean_timeout(Duration::from_millis(30))
            .with_poll_interval(Duration::from_millis(10));

        Mock::given(method("GET"))
            .and(path("/services/data/indexes/web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(index_body(json!({
                "maxTotalDataSizeMB": 800,
                "frozenTimePeriodInSecs": 3600,
                "totalEventCount": 42,
                "disabled": false,
            }))))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/services/data/indexes/web"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;
        for endpoint in ["disable", "enable", "roll-hot-buckets"] {
            Mock::given(method("POST"))
                .and(path(format!("/services/data/indexes/web/{endpoint}")))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server)
                .await;
        }

        let err = client.clean("web").await.unwrap_err();
        assert!(matches!(
            err,
            SplunkIndexError::ResourceState(ResourceStateError::CleanTimedOut { .. })
        ));
    }
}
