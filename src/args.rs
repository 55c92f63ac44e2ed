use clap::Parser;
use secrecy::SecretString;
use std::path::PathBuf;
use topic_harvest::api::Sort;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// API OAuth access token
    #[clap(long, env)]
    pub token: Option<SecretString>,

    /// User-Agent header sent with every request
    #[clap(long, env, default_value = "topic-harvest")]
    pub user_agent: String,

    /// Repository API URL
    #[clap(long, env, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Topic the harvested repositories are tagged with
    #[clap(short, long, env, default_value = "hack-for-la")]
    pub topic: String,

    /// Search results order
    #[clap(short, long, env, default_value = "updated")]
    pub sort: Sort,

    /// Also harvest issues of every repository
    #[clap(long, env)]
    pub with_issues: bool,

    /// File the harvested repositories are written to
    #[clap(short, long, env, default_value = "github-data.json")]
    pub output: PathBuf,
}
