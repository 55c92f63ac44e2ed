use clap::Parser;
use log::info;
use topic_harvest::api::Error;
use topic_harvest_app::Args;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();
    let output = args.output.clone();

    let records = topic_harvest_app::harvest(args).await?;

    info!("Harvested {} repositories into {}", records.len(), output.display());
    Ok(())
}
