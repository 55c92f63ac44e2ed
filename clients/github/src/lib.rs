mod builder;
mod pagination;
mod payload;

pub use builder::{GithubClientBuilder, DEFAULT_GITHUB_URL, DEFAULT_USER_AGENT};
pub use pagination::{parse_link_header, LinkPagination};

use anyhow::Context;
use async_trait::async_trait;
use futures::future::try_join_all;
use log::debug;
use pagination::FIRST_PAGE;
use reqwest::Client;
use reqwest::Response;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use topic_harvest::api::{Error, Repo, Result, Sort};
use url::Url;

pub struct GithubClient {
    client: Client,
    github_url: String,
}

impl GithubClient {
    async fn get(&self, url: Url) -> Result<Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn page(&self, url: Url) -> Result<Vec<Value>> {
        let response = self.get(url).await?;
        read_items(response).await
    }
}

#[async_trait]
impl topic_harvest::api::Client for GithubClient {
    async fn tagged_repos(&self, topic: &str, sort: Sort) -> Result<Vec<Repo>> {
        let request_url = format!("{}/search/repositories", self.github_url);
        let topic_query = format!("topic:{}", topic);
        let sort = sort.to_string();
        let url = parse_url(
            &request_url,
            &[("q", topic_query.as_str()), ("sort", sort.as_str()), ("order", "desc")],
        )?;
        let response = self.get(url).await?;
        let response = read_response::<payload::SearchRepos>(response).await?;
        debug!("Found {} repositories", response.items.len());
        Ok(response.items.into_iter().map(Repo::from).collect())
    }

    async fn languages(&self, url: &str) -> Result<Vec<String>> {
        let response = self.get(parse_url(url, &[])?).await?;
        let languages = read_response::<Map<String, Value>>(response).await?;
        Ok(languages.into_iter().map(|(language, _bytes)| language).collect())
    }

    async fn list(&self, url: &str) -> Result<Vec<Value>> {
        self.page(parse_url(url, &[])?).await
    }

    async fn all_pages(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<Value>> {
        let response = self.get(parse_url(url, query)?).await?;
        let first_page_url = response.url().clone();
        let last_page = pagination::last_page(response.headers())?;
        let mut items = read_items(response).await?;

        let last_page = match last_page {
            Some(last_page) if last_page > FIRST_PAGE => last_page,
            _ => return Ok(items),
        };
        debug!("Fetching {} pages of {}", last_page, first_page_url);
        let pages = try_join_all(
            (FIRST_PAGE + 1..=last_page).map(|page| self.page(pagination::page_url(&first_page_url, page))),
        )
        .await?;
        items.extend(pages.into_iter().flatten());
        Ok(items)
    }
}

fn parse_url(url: &str, query: &[(&str, &str)]) -> Result<Url> {
    let parsed = if query.is_empty() {
        Url::parse(url)
    } else {
        Url::parse_with_params(url, query)
    };
    Ok(parsed.with_context(|| format!("Invalid request URL {}", url))?)
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = read_body(response).await?;
    Ok(serde_json::from_slice(body.as_ref())?)
}

/// List items of a response, none for `204 No Content` or an empty body.
async fn read_items(response: Response) -> Result<Vec<Value>> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(Vec::new());
    }
    let body = read_body(response).await?;
    if body.as_ref().iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(body.as_ref())?)
}

async fn read_body(response: Response) -> Result<impl AsRef<[u8]>> {
    let url = response.url().clone();
    Ok(response
        .bytes()
        .await
        .with_context(|| format!("Failed to read response of {}", url))?)
}
