use async_trait::async_trait;
use derive_more::Constructor;
use serde_json::Value;
use strum_macros::{Display, EnumString};

pub use crate::error::{Error, Result};

/// Search results order. Always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Sort {
    Updated,
    Stars,
    Forks,
    HelpWantedIssues,
}

/// Repository as returned by the tagged repositories search.
///
/// `issues_url` and `issue_comment_url` are URI templates (e.g. `.../issues{/number}`).
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub languages_url: String,
    pub contributors_url: String,
    pub issues_url: String,
    pub issue_comment_url: String,
}

#[async_trait]
pub trait Client: Send + Sync {
    /// First page of repositories tagged with `topic`.
    async fn tagged_repos(&self, topic: &str, sort: Sort) -> Result<Vec<Repo>>;

    /// Language names in the order reported by the languages endpoint.
    async fn languages(&self, url: &str) -> Result<Vec<String>>;

    /// Single page of raw items.
    async fn list(&self, url: &str) -> Result<Vec<Value>>;

    /// Every page of raw items, in page order.
    async fn all_pages(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<Value>>;
}

#[test]
fn sort_parse_test() {
    use std::str::FromStr;
    assert_eq!(Sort::from_str("updated").unwrap(), Sort::Updated);
    assert_eq!(Sort::from_str("help-wanted-issues").unwrap(), Sort::HelpWantedIssues);
    assert_eq!(Sort::Stars.to_string(), "stars");
    assert!(Sort::from_str("popularity").is_err());
}
