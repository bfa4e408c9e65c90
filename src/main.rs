//! agentic-search - command line entry point
//!
//! Asks one question about one repository and prints the answer.

use agentic_search::{
    agent::{Agent, TaskPayload},
    github::RepositoryRef,
    Config,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "agentic-search",
    version,
    about = "Agentic search over a GitHub repo (no pre-ingestion)"
)]
struct Args {
    /// Repository as owner/name
    #[arg(long)]
    repo: String,

    /// Question to ask about the repository
    #[arg(long)]
    question: String,

    /// Branch or SHA (defaults to the repository's default branch)
    #[arg(long = "ref")]
    git_ref: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the answer.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentic_search=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;

    let repo = RepositoryRef::parse(&args.repo)
        .map_err(anyhow::Error::msg)?
        .with_ref(args.git_ref.as_deref());

    let agent = Agent::new(&config)?;
    info!("{} ready (model={})", agent.name(), agent.model());
    let answer = agent.run(&TaskPayload::new(&repo, &args.question)).await?;

    println!("{}", answer.text);
    Ok(())
}
