use anyhow::{Context, Result};
use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use wikisim::pipeline::{DEFAULT_RESULTS, MAX_RESULTS};
use wikisim::{connect_pipeline, logging, render_outcome, render_titles, FetchArgs, StoreArgs};

#[derive(Parser, Debug)]
#[command(
    name = "wikisim",
    about = "Recommend Wikipedia articles similar to a stored article"
)]
struct WikisimCli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    fetch: FetchArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every article title available for selection
    Titles,
    /// Show the selected article's excerpt and its most similar articles
    Search {
        /// Title of the stored article to start from
        #[arg(long)]
        title: String,

        /// Number of similar articles to list
        #[arg(
            long,
            default_value_t = DEFAULT_RESULTS,
            value_parser = clap::value_parser!(u8).range(1..=MAX_RESULTS as i64).map(usize::from)
        )]
        count: usize,

        /// Print the outcome as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init("warn");
    let cli = WikisimCli::parse();
    let pipeline = connect_pipeline(&cli.store, &cli.fetch).await?;

    match cli.command {
        Command::Titles => {
            let titles = pipeline.titles().await.context("failed to list titles")?;
            print!("{}", render_titles(&titles));
        }
        Command::Search { title, count, json } => {
            let outcome = pipeline
                .run_search(&title, count)
                .await
                .with_context(|| format!("search for {title:?} failed"))?;
            if json {
                let rendered = serde_json::to_string_pretty(&outcome)
                    .context("failed to serialize search outcome")?;
                println!("{rendered}");
            } else {
                print!("{}", render_outcome(&outcome));
            }
        }
    }
    Ok(())
}
