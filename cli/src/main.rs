mod report;

use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use vidfetch::config::{load_from, load_or_init};
use vidfetch::logging::{init_logging, init_logging_stderr};
use vidfetch::{CoreClient, MediaCategory, Session, SessionState};

use crate::report::Report;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Video page URL to resolve
    #[arg()]
    url: String,

    /// Save one media category after resolving (video, photo or audio)
    #[arg(long, value_name = "CATEGORY")]
    save: Option<MediaCategory>,

    /// Directory to save into
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Print the normalized result as JSON
    #[arg(long)]
    json: bool,

    /// Read configuration from this file instead of the XDG config dir
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Sent verbatim as the Authorization header
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Route requests through the configured CORS proxy
    #[arg(long)]
    proxy: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if let Err(e) = init_logging() {
        init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {e}");
    }

    let mut config = match &args.config {
        Some(path) => load_from(path)?,
        None => load_or_init()?,
    };
    if let Some(base) = args.api_base {
        config.api_base = base;
    }
    if args.api_key.is_some() {
        config.api_key = args.api_key;
    }
    if args.proxy {
        config.use_cors_proxy = true;
    }

    let client = CoreClient::new(config)?;
    let mut session = Session::new();
    let mut report = Report::new(io::stdout());

    let commands = client.run(&mut session, &args.url).await;
    if !args.json {
        report.apply_all(&commands)?;
    } else if session.state() == SessionState::Rendered {
        println!("{}", serde_json::to_string_pretty(&session.current())?);
    } else {
        Report::new(io::stderr()).apply_all(&commands)?;
    }
    if session.state() != SessionState::Rendered {
        return Ok(ExitCode::FAILURE);
    }

    if let Some(category) = args.save {
        let (commands, saved) = client
            .save(&mut session, category, &args.output_dir)
            .await;
        report.apply_all(&commands)?;
        if saved.is_none() {
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}
