//! HTTP client for the portfolio API
//!
//! Used by the public site sections (reads), by the CLI (admin calls) and as
//! the [`ChangeSource`] behind a [`RemoteChangeBridge`](crate::events::RemoteChangeBridge).

use crate::api::auth_handlers::{AuthTokenResponse, UserResponse};
use crate::content::{
    AboutInfo, ContactInfo, ContactMessage, Experience, Highlight, MessageFilter, Project, Skill,
    SkillCategory,
};
use crate::events::{ChangeNotification, ChangeSource, ChangeType};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin typed wrapper over the REST API
#[derive(Clone)]
pub struct PortfolioClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl PortfolioClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach an admin bearer token to subsequent requests
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send `request`, turning non-2xx answers into errors carrying the API's message
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let resp = self
            .authorized(request)
            .send()
            .await
            .with_context(|| format!("Request for {} failed", what))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            bail!("{} returned {}: {}", what, status.as_u16(), message);
        }

        resp.json::<T>()
            .await
            .with_context(|| format!("Invalid {} response", what))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.client.get(self.url(path)), path).await
    }

    // ========================================================================
    // Public reads
    // ========================================================================

    pub async fn about(&self) -> Result<AboutInfo> {
        self.get("/api/about/info").await
    }

    pub async fn highlights(&self) -> Result<Vec<Highlight>> {
        self.get("/api/about/highlights").await
    }

    pub async fn experiences(&self) -> Result<Vec<Experience>> {
        self.get("/api/experience").await
    }

    pub async fn projects(&self, featured: Option<bool>) -> Result<Vec<Project>> {
        match featured {
            Some(featured) => {
                self.get(&format!("/api/projects?featured={}", featured))
                    .await
            }
            None => self.get("/api/projects").await,
        }
    }

    pub async fn skills(&self) -> Result<Vec<Skill>> {
        self.get("/api/skills").await
    }

    pub async fn skills_grouped(&self) -> Result<Vec<SkillCategory>> {
        self.get("/api/skills/grouped").await
    }

    pub async fn contact_info(&self) -> Result<ContactInfo> {
        self.get("/api/contact/info").await
    }

    // ========================================================================
    // Admin
    // ========================================================================

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthTokenResponse> {
        let request = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }));
        self.send_json(request, "login").await
    }

    pub async fn me(&self) -> Result<UserResponse> {
        self.get("/api/users/me").await
    }

    /// Announce a change by hand (admin)
    pub async fn notify(&self, change_type: ChangeType) -> Result<ChangeNotification> {
        let request = self
            .client
            .post(self.url("/api/changes"))
            .json(&serde_json::json!({ "changeType": change_type }));
        self.send_json(request, "notify").await
    }

    pub async fn messages(&self, filter: &MessageFilter) -> Result<Vec<ContactMessage>> {
        let request = self.client.get(self.url("/api/contact/messages")).query(&[
            ("offset", filter.offset.to_string()),
            ("limit", filter.limit.to_string()),
            ("unread_only", filter.unread_only.to_string()),
        ]);
        self.send_json(request, "messages").await
    }

    // ========================================================================
    // Change slot
    // ========================================================================

    /// Raw payload of the server's change slot; `None` when nothing was announced yet
    pub async fn latest_change(&self) -> Result<Option<String>> {
        let resp = self
            .client
            .get(self.url("/api/changes/latest"))
            .send()
            .await
            .context("Failed to poll latest change")?;

        match resp.status() {
            StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => Ok(Some(
                resp.text().await.context("Failed to read change payload")?,
            )),
            status => bail!("latest change returned {}", status.as_u16()),
        }
    }
}

#[async_trait]
impl ChangeSource for PortfolioClient {
    async fn latest_change(&self) -> Result<Option<String>> {
        PortfolioClient::latest_change(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_trailing_slash() {
        let client = PortfolioClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/health"), "http://localhost:8000/api/health");
    }

    #[tokio::test]
    async fn test_highlights_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/about/highlights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "icon": "🎓", "text": "MSc", "order_index": 1,
                 "created_at": "2024-01-01T00:00:00Z"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = PortfolioClient::new(&server.uri()).unwrap();
        let highlights = client.highlights().await.unwrap();
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].text, "MSc");
    }

    #[tokio::test]
    async fn test_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/about/info"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "About information not found"})),
            )
            .mount(&server)
            .await;

        let client = PortfolioClient::new(&server.uri()).unwrap();
        let err = client.about().await.unwrap_err().to_string();
        assert!(err.contains("404"));
        assert!(err.contains("About information not found"));
    }

    #[tokio::test]
    async fn test_notify_sends_token_and_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/changes"))
            .and(header("authorization", "Bearer t0ken"))
            .and(body_json(serde_json::json!({"changeType": "skills"})))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_json(serde_json::json!({"changeType": "skills", "timestamp": 42})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = PortfolioClient::new(&server.uri())
            .unwrap()
            .with_token("t0ken");
        let notification = client.notify(ChangeType::Skills).await.unwrap();
        assert_eq!(notification.change_type, ChangeType::Skills);
        assert_eq!(notification.timestamp, 42);
    }

    #[tokio::test]
    async fn test_messages_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/contact/messages"))
            .and(query_param("unread_only", "true"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = PortfolioClient::new(&server.uri()).unwrap();
        let filter = MessageFilter {
            offset: 0,
            limit: 5,
            unread_only: true,
        };
        assert!(client.messages(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_change_empty_and_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/changes/latest"))
            .respond_with(ResponseTemplate::new(204))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/changes/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"changeType":"about","timestamp":7}"#),
            )
            .mount(&server)
            .await;

        let client = PortfolioClient::new(&server.uri()).unwrap();
        assert_eq!(client.latest_change().await.unwrap(), None);
        assert_eq!(
            client.latest_change().await.unwrap().as_deref(),
            Some(r#"{"changeType":"about","timestamp":7}"#)
        );
    }
}
