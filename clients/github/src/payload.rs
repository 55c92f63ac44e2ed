use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct SearchRepos {
    pub items: Vec<Repo>,
}

#[derive(Deserialize, Debug)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub languages_url: String,
    pub contributors_url: String,
    pub issues_url: String,
    pub issue_comment_url: String,
}

impl From<Repo> for topic_harvest::api::Repo {
    fn from(repo: Repo) -> Self {
        topic_harvest::api::Repo {
            id: repo.id,
            name: repo.name,
            languages_url: repo.languages_url,
            contributors_url: repo.contributors_url,
            issues_url: repo.issues_url,
            issue_comment_url: repo.issue_comment_url,
        }
    }
}
