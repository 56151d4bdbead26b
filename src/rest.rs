use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::backend::Backend;
use crate::connection::CursorConnection;
use crate::error::{HubError, Result};
use crate::profile::Profile;

pub struct RestBackend {
    client: Client,
    endpoint: String,
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl RestBackend {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("hubprofile/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(HubError::Api(format!("{} returned {}: {}", url, status, text)));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Backend for RestBackend {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn profile(&self, login: &str) -> Result<Profile> {
        let url = format!("{}/profile/{}", self.endpoint, login);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::info!(%login, "profile not found");
                Ok(Profile::NotFound)
            }
            status if status.is_success() => {
                let body = response.bytes().await?;
                Profile::from_json(serde_json::from_slice(&body)?)
            }
            status => {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(HubError::Api(format!("{} returned {}: {}", url, status, text)))
            }
        }
    }

    async fn organizations(&self, login: &str) -> Result<CursorConnection> {
        let url = format!("{}/user/{}/organizations", self.endpoint, login);
        self.get_json(&url).await
    }

    async fn page(&self, url: &str) -> Result<CursorConnection> {
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> RestBackend {
        RestBackend::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn endpoint_drops_trailing_slash() {
        let server = MockServer::start().await;
        assert_eq!(backend(&server).endpoint(), server.uri());
    }

    #[tokio::test]
    async fn profile_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/belchior"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "__typename": "User",
                "_id": { "$oid": "48ce" },
                "login": "belchior",
                "avatarUrl": "a.png",
                "email": "belchior@email.com",
                "url": "https://github.com/belchior"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = backend(&server).profile("belchior").await.unwrap();
        assert_eq!(profile.login(), Some("belchior"));
        assert!(matches!(profile, Profile::User(_)));
    }

    #[tokio::test]
    async fn profile_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/nobody"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Profile not found",
                "status": 404
            })))
            .mount(&server)
            .await;

        let profile = backend(&server).profile("nobody").await.unwrap();
        assert_eq!(profile, Profile::NotFound);
    }

    #[tokio::test]
    async fn profile_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = backend(&server).profile("belchior").await.unwrap_err();
        assert!(matches!(err, HubError::Api(_)));
    }

    #[tokio::test]
    async fn organizations_connection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/belchior/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "edges": [{ "cursor": "MQ==", "node": { "id": "1234", "login": "tc39" } }],
                "pageInfo": { "hasNextPage": false, "hasPreviousPage": false, "startCursor": "MQ==", "endCursor": "MQ==" }
            })))
            .mount(&server)
            .await;

        let orgs = backend(&server).organizations("belchior").await.unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs.page_info.end_cursor, "MQ==");
    }

    #[tokio::test]
    async fn page_with_cursor_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organization/tc39/people"))
            .and(query_param("after", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "edges": [],
                "pageInfo": { "endCursor": null }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/organization/tc39/people?after=abc", server.uri());
        let page = backend(&server).page(&url).await.unwrap();
        assert!(page.is_empty());
        assert!(!page.has_next_page());
    }

    #[tokio::test]
    async fn malformed_page_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let url = format!("{}/user/belchior/followers", server.uri());
        let err = backend(&server).page(&url).await.unwrap_err();
        assert!(matches!(err, HubError::Json(_)));
    }
}
