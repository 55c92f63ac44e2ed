use crate::api::{Client, Result, Sort};
use crate::model::{Category, Comment, Contributor, FetchSlot, Issue, RepositoryRecord};
use crate::projection::{project_all, project_comment, project_contributor, project_issue};
use crate::sink::Sink;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::{Future, FutureExt};
use log::{debug, error, info};
use std::sync::Arc;

const ISSUES_QUERY: &[(&str, &str)] = &[("state", "all")];

/// Categories fetched for every repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categories {
    pub languages: bool,
    pub contributors: bool,
    pub issues: bool,
    pub comments: bool,
}

impl Default for Categories {
    fn default() -> Self {
        Categories {
            languages: true,
            contributors: true,
            issues: false,
            comments: true,
        }
    }
}

impl Categories {
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Languages => self.languages,
            Category::Contributors => self.contributors,
            Category::Issues => self.issues,
            Category::Comments => self.comments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    pub topic: String,
    pub sort: Sort,
    pub categories: Categories,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            topic: "hack-for-la".to_string(),
            sort: Sort::Updated,
            categories: Categories::default(),
        }
    }
}

pub struct Harvester<CLIENT>
where
    CLIENT: Client,
{
    client: Arc<CLIENT>,
    config: HarvestConfig,
}

impl<CLIENT> Harvester<CLIENT>
where
    CLIENT: Client,
{
    pub fn new(client: CLIENT, config: HarvestConfig) -> Self {
        Harvester {
            client: Arc::new(client),
            config,
        }
    }

    /// Harvests all tagged repositories and hands the result to `sink` once every category has completed.
    pub async fn harvest_into<SINK: Sink>(&self, sink: &SINK) -> Result<Vec<RepositoryRecord>> {
        let records = self.harvest().await?;
        sink.persist(&records)?;
        info!("Persisted {} repositories", records.len());
        Ok(records)
    }

    /// Record `i` of the result belongs to item `i` of the tagged repositories search.
    pub async fn harvest(&self) -> Result<Vec<RepositoryRecord>> {
        let repos = self.client.tagged_repos(&self.config.topic, self.config.sort).await?;
        info!("Found {} repositories tagged with {}", repos.len(), self.config.topic);
        let mut records: Vec<RepositoryRecord> = repos.into_iter().map(RepositoryRecord::from).collect();

        let categories = self.config.categories;
        let mut pending = FuturesUnordered::new();
        if categories.is_enabled(Category::Languages) {
            let urls = slot_urls(&records, |r| &r.languages);
            pending.push(
                async move {
                    let fetches = urls.iter().map(|url| self.languages(url));
                    Fetched::Languages(self.category(Category::Languages, fetches).await)
                }
                .boxed_local(),
            );
        }
        if categories.is_enabled(Category::Contributors) {
            let urls = slot_urls(&records, |r| &r.contributors);
            pending.push(
                async move {
                    let fetches = urls.iter().map(|url| self.contributors(url));
                    Fetched::Contributors(self.category(Category::Contributors, fetches).await)
                }
                .boxed_local(),
            );
        }
        if categories.is_enabled(Category::Issues) {
            let urls = slot_urls(&records, |r| &r.issues);
            pending.push(
                async move {
                    let fetches = urls.iter().map(|url| self.issues(url));
                    Fetched::Issues(self.category(Category::Issues, fetches).await)
                }
                .boxed_local(),
            );
        }
        if categories.is_enabled(Category::Comments) {
            let urls = slot_urls(&records, |r| &r.comments);
            pending.push(
                async move {
                    let fetches = urls.iter().map(|url| self.comments(url));
                    Fetched::Comments(self.category(Category::Comments, fetches).await)
                }
                .boxed_local(),
            );
        }
        debug!("Fetching {} categories", pending.len());

        // Categories are written into the records in completion order
        while let Some(fetched) = pending.next().await {
            match fetched {
                Fetched::Languages(results) => settle(&mut records, Category::Languages, results, |r| &mut r.languages),
                Fetched::Contributors(results) => {
                    settle(&mut records, Category::Contributors, results, |r| &mut r.contributors)
                }
                Fetched::Issues(results) => settle(&mut records, Category::Issues, results, |r| &mut r.issues),
                Fetched::Comments(results) => settle(&mut records, Category::Comments, results, |r| &mut r.comments),
            }
        }

        Ok(records)
    }

    /// Awaits one category for all repositories, results in repository order.
    async fn category<T, FUT>(&self, category: Category, fetches: impl Iterator<Item = FUT>) -> Vec<Result<T>>
    where
        FUT: Future<Output = Result<T>>,
    {
        let results = join_all(fetches).await;
        info!("Fetched {} for {} repositories", category, results.len());
        results
    }

    async fn languages(&self, url: &str) -> Result<Vec<String>> {
        self.client.languages(url).await
    }

    async fn contributors(&self, url: &str) -> Result<Vec<Contributor>> {
        let raw = self.client.list(url).await?;
        project_all(raw, project_contributor)
    }

    async fn issues(&self, url: &str) -> Result<Vec<Issue>> {
        let raw = self.client.all_pages(url, ISSUES_QUERY).await?;
        project_all(raw, project_issue)
    }

    async fn comments(&self, url: &str) -> Result<Vec<Comment>> {
        let raw = self.client.all_pages(url, &[]).await?;
        project_all(raw, project_comment)
    }
}

/// Results of one category, entry `i` belonging to record `i`.
enum Fetched {
    Languages(Vec<Result<Vec<String>>>),
    Contributors(Vec<Result<Vec<Contributor>>>),
    Issues(Vec<Result<Vec<Issue>>>),
    Comments(Vec<Result<Vec<Comment>>>),
}

/// Utility functions

fn slot_urls<T>(records: &[RepositoryRecord], slot: fn(&RepositoryRecord) -> &FetchSlot<T>) -> Vec<String> {
    records.iter().map(|record| slot(record).url.clone()).collect()
}

fn settle<T>(
    records: &mut [RepositoryRecord],
    category: Category,
    results: Vec<Result<T>>,
    slot: fn(&mut RepositoryRecord) -> &mut FetchSlot<T>,
) {
    debug_assert_eq!(records.len(), results.len());
    for (record, result) in records.iter_mut().zip(results) {
        if let Err(err) = &result {
            error!("Failed to fetch {} of {}: {}", category, record.name, err);
        }
        slot(record).settle(result);
    }
}

/// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Error, Repo};
    use async_trait::async_trait;
    use rand::Rng;
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    const API: &str = "https://api.github.com";

    #[derive(Default)]
    struct FakeClient {
        repo_count: u64,
        failing_urls: HashSet<String>,
        fail_search: bool,
        slow_languages: bool,
        queries: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FakeClient {
        fn new(repo_count: u64) -> Self {
            FakeClient {
                repo_count,
                ..FakeClient::default()
            }
        }

        fn failing(mut self, url: &str) -> Self {
            self.failing_urls.insert(url.to_string());
            self
        }

        async fn respond<T>(&self, url: &str, body: T) -> Result<T> {
            let delay = rand::thread_rng().gen_range(0..20);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if self.failing_urls.contains(url) {
                return Err(Error::Http {
                    url: url.to_string(),
                    status: 500,
                });
            }
            Ok(body)
        }
    }

    fn repo_url(index: u64) -> String {
        format!("{}/repos/owner/repo_{}", API, index)
    }

    fn repo_index(url: &str) -> u64 {
        url.trim_start_matches(&format!("{}/repos/owner/repo_", API))
            .split('/')
            .next()
            .and_then(|index| index.parse().ok())
            .unwrap()
    }

    #[async_trait]
    impl Client for FakeClient {
        async fn tagged_repos(&self, topic: &str, sort: Sort) -> Result<Vec<Repo>> {
            assert_eq!(topic, "hack-for-la");
            assert_eq!(sort, Sort::Updated);
            if self.fail_search {
                return Err(Error::Http {
                    url: "search".to_string(),
                    status: 422,
                });
            }
            Ok((0..self.repo_count)
                .map(|index| {
                    let url = repo_url(index);
                    Repo::new(
                        100 + index,
                        format!("repo_{}", index),
                        format!("{}/languages", url),
                        format!("{}/contributors", url),
                        format!("{}/issues{{/number}}", url),
                        format!("{}/issues/comments{{/number}}", url),
                    )
                })
                .collect())
        }

        async fn languages(&self, url: &str) -> Result<Vec<String>> {
            let index = repo_index(url);
            if self.slow_languages {
                tokio::time::sleep(Duration::from_millis(150)).await;
            }
            self.respond(url, vec![format!("Lang{}", index), "HTML".to_string()]).await
        }

        async fn list(&self, url: &str) -> Result<Vec<Value>> {
            let index = repo_index(url);
            let body = (0..3).map(|user| json!({ "id": index * 10 + user, "login": "x" })).collect();
            self.respond(url, body).await
        }

        async fn all_pages(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<Value>> {
            self.queries.lock().unwrap().push((
                url.to_string(),
                query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ));
            let index = repo_index(url);
            let body = (0..10).map(|item| json!({ "id": index * 100 + item, "number": item })).collect();
            self.respond(url, body).await
        }
    }

    struct CountingSink {
        calls: Mutex<Vec<usize>>,
    }

    impl Sink for CountingSink {
        fn persist(&self, records: &[RepositoryRecord]) -> Result<()> {
            self.calls.lock().unwrap().push(records.len());
            Ok(())
        }
    }

    #[tokio::test]
    async fn positional_correspondence_test() {
        let harvester = Harvester::new(FakeClient::new(25), HarvestConfig::default());
        let records = harvester.harvest().await.unwrap();

        assert_eq!(records.len(), 25);
        for (index, record) in records.iter().enumerate() {
            let index = index as u64;
            assert_eq!(record.id, 100 + index);
            assert_eq!(record.name, format!("repo_{}", index));
            assert_eq!(
                record.languages.data(),
                Some(&vec![format!("Lang{}", index), "HTML".to_string()])
            );
            let contributors = record.contributors.data().unwrap();
            assert_eq!(
                contributors.iter().map(|c| c.id.unwrap()).collect::<Vec<_>>(),
                vec![index * 10, index * 10 + 1, index * 10 + 2]
            );
            let comments = record.comments.data().unwrap();
            assert_eq!(comments.len(), 10);
            assert_eq!(comments[0].id, Some(index * 100));
            assert!(record.issues.is_pending());
        }
    }

    #[tokio::test]
    async fn template_urls_trimmed_test() {
        let harvester = Harvester::new(FakeClient::new(1), HarvestConfig::default());
        let records = harvester.harvest().await.unwrap();
        assert_eq!(records[0].issues.url, format!("{}/issues", repo_url(0)));
        assert_eq!(records[0].comments.url, format!("{}/issues/comments", repo_url(0)));
    }

    #[tokio::test]
    async fn failure_isolated_test() {
        let failing = format!("{}/contributors", repo_url(1));
        let harvester = Harvester::new(FakeClient::new(3).failing(&failing), HarvestConfig::default());
        let records = harvester.harvest().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1].contributors.error(),
            Some(format!("GET {} failed with status 500", failing).as_str())
        );
        assert!(records[1].languages.data().is_some());
        assert!(records[1].comments.data().is_some());
        assert!(records[0].contributors.data().is_some());
        assert!(records[2].contributors.data().is_some());
        assert_eq!(records[1].failures(), vec![(Category::Contributors, records[1].contributors.error().unwrap())]);
    }

    #[tokio::test]
    async fn issues_enabled_test() {
        let config = HarvestConfig {
            categories: Categories {
                issues: true,
                ..Categories::default()
            },
            ..HarvestConfig::default()
        };
        let harvester = Harvester::new(FakeClient::new(2), config);
        let records = harvester.harvest().await.unwrap();

        for record in &records {
            assert_eq!(record.issues.data().unwrap().len(), 10);
        }
        let queries = harvester.client.queries.lock().unwrap();
        let issue_query = queries
            .iter()
            .find(|(url, _)| url.ends_with("/repo_0/issues"))
            .map(|(_, query)| query.clone());
        assert_eq!(issue_query, Some(vec![("state".to_string(), "all".to_string())]));
        let comment_query = queries
            .iter()
            .find(|(url, _)| url.ends_with("/repo_0/issues/comments"))
            .map(|(_, query)| query.clone());
        assert_eq!(comment_query, Some(Vec::new()));
    }

    #[tokio::test]
    async fn disabled_categories_test() {
        let config = HarvestConfig {
            categories: Categories {
                languages: false,
                contributors: true,
                issues: false,
                comments: false,
            },
            ..HarvestConfig::default()
        };
        let harvester = Harvester::new(FakeClient::new(2), config);
        let records = harvester.harvest().await.unwrap();

        for record in &records {
            assert!(record.languages.is_pending());
            assert!(record.comments.is_pending());
            assert!(record.contributors.data().is_some());
        }
        assert!(harvester.client.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn slow_category_test() {
        let client = FakeClient {
            slow_languages: true,
            ..FakeClient::new(5)
        };
        let harvester = Harvester::new(client, HarvestConfig::default());
        let records = harvester.harvest().await.unwrap();

        for (index, record) in records.iter().enumerate() {
            assert_eq!(
                record.languages.data(),
                Some(&vec![format!("Lang{}", index), "HTML".to_string()])
            );
            assert_eq!(record.contributors.data().unwrap()[0].id, Some(index as u64 * 10));
            assert_eq!(record.comments.data().unwrap().len(), 10);
        }
    }

    #[tokio::test]
    async fn no_categories_test() {
        let config = HarvestConfig {
            categories: Categories {
                languages: false,
                contributors: false,
                issues: false,
                comments: false,
            },
            ..HarvestConfig::default()
        };
        let harvester = Harvester::new(FakeClient::new(3), config);
        let records = harvester.harvest().await.unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|record| record.failures().is_empty() && record.languages.is_pending()));
    }

    #[tokio::test]
    async fn sink_invoked_once_test() {
        let sink = CountingSink {
            calls: Mutex::new(Vec::new()),
        };
        let harvester = Harvester::new(FakeClient::new(4), HarvestConfig::default());
        let records = harvester.harvest_into(&sink).await.unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(*sink.calls.lock().unwrap(), vec![4]);
    }

    #[tokio::test]
    async fn search_failure_test() {
        let sink = CountingSink {
            calls: Mutex::new(Vec::new()),
        };
        let client = FakeClient {
            fail_search: true,
            ..FakeClient::new(4)
        };
        let harvester = Harvester::new(client, HarvestConfig::default());

        assert!(harvester.harvest_into(&sink).await.is_err());
        assert!(sink.calls.lock().unwrap().is_empty());
    }
}
