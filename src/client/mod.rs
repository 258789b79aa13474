use crate::cookie;
use crate::model::{ActionKind, AutocompleteResponse, ClientConfig};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};

/// Cookie holding the cross-site-request-forgery token. The same name is used
/// for the form field echoed back on state-changing requests.
const XSRF_COOKIE: &str = "_xsrf";

/// HTTP client for the build service web interface.
#[derive(Debug, Clone)]
pub struct BuildServiceClient {
    http: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
}

impl BuildServiceClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cfg.cookie.as_deref() {
            let value = HeaderValue::from_str(cookie)
                .context("session cookie contains characters not allowed in a header")?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            cookie: cfg.cookie.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST form-encoded parameters to `path` and decode the response body
    /// strictly as JSON.
    ///
    /// The `_xsrf` token read from the session cookie is always merged into
    /// the outgoing parameters; when the cookie is absent the field is sent
    /// empty and the server rejects the request explicitly. Non-2xx statuses
    /// and undecodable bodies are errors, never silently swallowed.
    pub async fn post_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        let token =
            cookie::get(self.cookie.as_deref().unwrap_or(""), XSRF_COOKIE).unwrap_or_default();
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push((XSRF_COOKIE, token.as_str()));

        let resp = self
            .http
            .post(self.url(path))
            .form(&form)
            .send()
            .await
            .with_context(|| format!("POST {} failed", path))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read response body from {}", path))?;
        if !status.is_success() {
            anyhow::bail!("POST {} returned {}: {}", path, status, body.trim());
        }

        serde_json::from_str(&body)
            .with_context(|| format!("response from {} was not valid JSON", path))
    }

    /// Fetch package name suggestions for `query`.
    pub async fn autocomplete(&self, query: &str) -> Result<AutocompleteResponse> {
        let resp = self
            .http
            .get(self.url("/api/packages/autocomplete"))
            .query(&[("q", query)])
            .send()
            .await
            .context("autocomplete request failed")?
            .error_for_status()
            .context("autocomplete request rejected")?;

        resp.json::<AutocompleteResponse>()
            .await
            .context("autocomplete response did not match the expected shape")
    }

    /// Trigger a repository action. The response body is decoded but its
    /// content carries no information the client acts on.
    pub async fn action(&self, kind: ActionKind, id: &str) -> Result<serde_json::Value> {
        let path = format!("/api/action/{}", kind.as_path_str());
        self.post_json(&path, &[("id", id)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str, cookie: Option<&str>) -> ClientConfig {
        ClientConfig {
            base_url: base_url.to_string(),
            cookie: cookie.map(str::to_string),
            timeout: Duration::from_secs(5),
            user_agent: "pbs-web-cli-test".to_string(),
        }
    }

    #[tokio::test]
    async fn post_json_sends_xsrf_token_from_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/action/run"))
            .and(body_string("id=42&_xsrf=tok123"))
            .and(header("cookie", "a=1; _xsrf=tok123; b=2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            BuildServiceClient::new(&test_config(&server.uri(), Some("a=1; _xsrf=tok123; b=2")))
                .unwrap();
        client.action(ActionKind::Run, "42").await.unwrap();
    }

    #[tokio::test]
    async fn post_json_sends_empty_xsrf_when_cookie_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/action/remove"))
            .and(body_string("id=7&_xsrf="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = BuildServiceClient::new(&test_config(&server.uri(), None)).unwrap();
        client.action(ActionKind::Remove, "7").await.unwrap();
    }

    #[tokio::test]
    async fn post_json_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/action/run"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let client = BuildServiceClient::new(&test_config(&server.uri(), None)).unwrap();
        let err = client.action(ActionKind::Run, "42").await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn post_json_rejects_non_json_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/action/run"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>surprise</html>"))
            .mount(&server)
            .await;

        let client = BuildServiceClient::new(&test_config(&server.uri(), None)).unwrap();
        let err = client.action(ActionKind::Run, "42").await.unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[tokio::test]
    async fn autocomplete_decodes_query_and_packages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/packages/autocomplete"))
            .and(query_param("q", "req"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": "req",
                "packages": ["requests", "reqwest"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BuildServiceClient::new(&test_config(&server.uri(), None)).unwrap();
        let resp = client.autocomplete("req").await.unwrap();
        assert_eq!(resp.query, "req");
        assert_eq!(resp.packages, vec!["requests", "reqwest"]);
    }
}
