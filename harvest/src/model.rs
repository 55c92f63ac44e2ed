use crate::error::Result;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Kind of data fetched for every repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Languages,
    Contributors,
    Issues,
    Comments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotState<T> {
    Pending,
    Fetched { data: T },
    Failed { error: String },
}

/// Source URL of one category and the outcome of fetching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchSlot<T> {
    pub url: String,
    #[serde(flatten)]
    pub state: SlotState<T>,
}

impl<T> FetchSlot<T> {
    pub fn new(url: impl Into<String>) -> Self {
        FetchSlot {
            url: url.into(),
            state: SlotState::Pending,
        }
    }

    /// Stores the fetch outcome. A slot is settled at most once per run.
    pub fn settle(&mut self, result: Result<T>) {
        debug_assert!(self.is_pending(), "slot {} settled twice", self.url);
        self.state = match result {
            Ok(data) => SlotState::Fetched { data },
            Err(err) => SlotState::Failed {
                error: err.to_string(),
            },
        };
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SlotState::Pending)
    }

    pub fn data(&self) -> Option<&T> {
        match &self.state {
            SlotState::Fetched { data } => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SlotState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: u64,
    pub name: String,
    pub languages: FetchSlot<Vec<String>>,
    pub contributors: FetchSlot<Vec<Contributor>>,
    pub issues: FetchSlot<Vec<Issue>>,
    pub comments: FetchSlot<Vec<Comment>>,
}

impl RepositoryRecord {
    /// Categories of this record which failed, with their error messages.
    pub fn failures(&self) -> Vec<(Category, &str)> {
        [
            (Category::Languages, self.languages.error()),
            (Category::Contributors, self.contributors.error()),
            (Category::Issues, self.issues.error()),
            (Category::Comments, self.comments.error()),
        ]
        .into_iter()
        .filter_map(|(category, error)| error.map(|error| (category, error)))
        .collect()
    }
}

#[cfg(feature = "api")]
impl From<crate::api::Repo> for RepositoryRecord {
    fn from(repo: crate::api::Repo) -> Self {
        RepositoryRecord {
            id: repo.id,
            name: repo.name,
            languages: FetchSlot::new(repo.languages_url),
            contributors: FetchSlot::new(trim_uri_template(&repo.contributors_url)),
            issues: FetchSlot::new(trim_uri_template(&repo.issues_url)),
            comments: FetchSlot::new(trim_uri_template(&repo.issue_comment_url)),
        }
    }
}

/// Strips a trailing URI template expression, `.../issues{/number}` becomes `.../issues`.
pub fn trim_uri_template(url: &str) -> &str {
    match url.rfind('{') {
        Some(start) if url.ends_with('}') => &url[..start],
        _ => url,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravatar_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<IssueUser>,
    /// Number of comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<CommentUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravatar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}
