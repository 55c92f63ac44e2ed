use crate::GithubClient;
use anyhow::Context;
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use topic_harvest::api::Result;

pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "topic-harvest";

pub struct GithubClientBuilder {
    client_builder: ClientBuilder,
    github_url: String,
    headers: HeaderMap,
}

impl Default for GithubClientBuilder {
    fn default() -> Self {
        let mut headers = HeaderMap::default();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        Self {
            client_builder: ClientBuilder::default(),
            github_url: DEFAULT_GITHUB_URL.to_string(),
            headers,
        }
    }
}

impl GithubClientBuilder {
    pub fn try_with_token(self, token: secrecy::SecretString) -> Result<GithubClientBuilder> {
        let mut value = HeaderValue::from_str(&format!("token {}", token.expose_secret()))
            .context("Token is not a valid header value")?;
        value.set_sensitive(true);
        Ok(self.with_header_value(header::AUTHORIZATION, value))
    }

    pub fn try_with_user_agent<STR: AsRef<str>>(self, user_agent: STR) -> Result<GithubClientBuilder> {
        Ok(self.try_with_header(header::USER_AGENT, user_agent)?)
    }

    pub fn with_github_url<STR: AsRef<str>>(mut self, url: STR) -> GithubClientBuilder {
        self.github_url = url.as_ref().trim_end_matches('/').to_string();
        self
    }

    fn try_with_header(self, key: HeaderName, val: impl AsRef<str>) -> anyhow::Result<GithubClientBuilder> {
        let val = HeaderValue::from_str(val.as_ref())?;
        Ok(self.with_header_value(key, val))
    }

    fn with_header_value(mut self, key: HeaderName, val: HeaderValue) -> GithubClientBuilder {
        self.headers.insert(key, val);
        self
    }

    pub fn build(self) -> Result<GithubClient> {
        let client = self
            .client_builder
            .default_headers(self.headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(GithubClient {
            client,
            github_url: self.github_url,
        })
    }
}

#[test]
fn invalid_user_agent_test() {
    assert!(GithubClientBuilder::default().try_with_user_agent("bad\nagent").is_err());
}
