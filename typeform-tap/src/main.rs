use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use typeform_core::{State, TapConfig, TypeformClient};

use typeform_tap::singer;
use typeform_tap::streams::ALL_STREAMS;
use typeform_tap::sync::Tap;

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract Typeform forms, questions and answers", long_about = None)]
struct Args {
    /// Tap configuration (JSON or TOML)
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Bookmarks from a previous run
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Print the stream catalog and exit
    #[arg(long)]
    discover: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // stdout carries the messages, so logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.discover {
        println!(
            "{}",
            serde_json::to_string_pretty(&singer::catalog(&ALL_STREAMS))?
        );
        return Ok(());
    }

    let config = match TapConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let state = match &args.state {
        Some(path) => State::load(path)?,
        None => State::default(),
    };

    let client = TypeformClient::new(&config)?;

    let stdout = BufWriter::new(std::io::stdout().lock());
    let mut tap = Tap::new(&client, &config, state, stdout);
    tap.sync().await?;
    tap.into_writer().flush()?;

    Ok(())
}
