use anyhow::Context as _;
use clap::{Parser, Subcommand};

use upload_relay::context;
use upload_relay::logger::setup_logger;
use upload_relay::manifest::Manifest;
use upload_relay::store::{ContentStore, GitHubStore, UpdateOutcome};

#[derive(Parser)]
#[clap(version, about = "Inspect and prepare the gallery manifest")]
struct Opts {
    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Print the current manifest and its version.
    Manifest,
    /// Create an empty manifest unless one already exists.
    Init,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let opts: Opts = Opts::parse();
    let config = context::init()?;
    setup_logger(config)?;
    config.token.as_ref().context("GITHUB_TOKEN must be set")?;
    let store = GitHubStore::new(config)?;
    let existing = store.read_file(&config.manifest_path).await?;

    match opts.subcmd {
        SubCommand::Manifest => {
            let file = existing.with_context(|| format!("{} does not exist yet", config.manifest_path))?;
            let manifest = Manifest::decode(&file.content)?;
            println!("# {} @ {}", config.manifest_path, file.sha);
            println!("{}", serde_json::to_string_pretty(&manifest)?);
            println!("# {} images, {} videos", manifest.images.len(), manifest.videos.len());
        }
        SubCommand::Init => {
            if existing.is_some() {
                println!("{} already exists", config.manifest_path);
                return Ok(());
            }
            let content = Manifest::default().encode()?;
            let outcome = store
                .update_file(&config.manifest_path, &content, None, "Create gallery manifest")
                .await?;
            match outcome {
                UpdateOutcome::Updated => println!("created {}", config.manifest_path),
                UpdateOutcome::Conflict => anyhow::bail!("{} was created concurrently", config.manifest_path),
            }
        }
    }
    Ok(())
}
