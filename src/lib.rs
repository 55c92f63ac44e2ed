use github_client::GithubClientBuilder;
use log::warn;
use topic_harvest::api::Result;
use topic_harvest::{Categories, HarvestConfig, Harvester, JsonFileSink, RepositoryRecord};

mod args;

pub use args::Args;

/// Harvests every repository tagged with `args.topic` and writes them to `args.output`.
pub async fn harvest(args: Args) -> Result<Vec<RepositoryRecord>> {
    let mut client = GithubClientBuilder::default()
        .with_github_url(args.api_url)
        .try_with_user_agent(args.user_agent)?;
    if let Some(token) = args.token {
        client = client.try_with_token(token)?;
    }
    let client = client.build()?;

    let config = HarvestConfig {
        topic: args.topic,
        sort: args.sort,
        categories: Categories {
            issues: args.with_issues,
            ..Categories::default()
        },
    };
    let sink = JsonFileSink::new(args.output);
    let records = Harvester::new(client, config).harvest_into(&sink).await?;

    for record in &records {
        for (category, error) in record.failures() {
            warn!("{} of {} not harvested: {}", category, record.name, error);
        }
    }
    Ok(records)
}
