mod capture;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use records::{DataUrl, DataUrlError, EntryShape, FileStorage, HistoryError, HistoryStore, LoginError, Session};
use tracing::Level;

use crate::capture::{CaptureError, CapturedImage, HttpPredictor, PredictError, Predictor, StubPredictor};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error("http client setup failed: {0}")]
    Client(#[from] PredictError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error("no history entry with id {0}")]
    NotFound(u64),
    #[error("stored image is not a data URL: {0}")]
    StoredImage(#[from] DataUrlError),
    #[error("could not write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Parser, Debug)]
#[command(name = "age-cli", about = "Age prediction client: capture, predict, and browse history")]
struct Cli {
    /// Predict endpoint URL.
    #[arg(long, env = "AGE_PREDICT_URL", default_value = capture::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// File holding the local history storage.
    #[arg(long, env = "AGE_HISTORY_FILE", default_value = "age-predict-storage.json")]
    history_file: PathBuf,

    /// Request timeout in seconds; must be at least 1.
    #[arg(long, env = "AGE_PREDICT_TIMEOUT_SECS", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the prediction service is up.
    Ping,
    Login {
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    Logout,
    Predict(PredictArgs),
    History(HistoryCommand),
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Image file to upload.
    #[arg(long, conflicts_with = "data_url", required_unless_present = "data_url")]
    file: Option<PathBuf>,

    /// Image as a data URL, e.g. a webcam screenshot.
    #[arg(long)]
    data_url: Option<String>,

    /// Answer with a constant age instead of calling the endpoint.
    #[arg(long, default_value_t = false)]
    stub: bool,

    #[arg(long, default_value_t = capture::DEFAULT_STUB_AGE)]
    stub_age: u32,

    /// History entry shape: `scored` or `dated`. Defaults per predictor.
    #[arg(long)]
    shape: Option<EntryShape>,
}

#[derive(Args, Debug)]
struct HistoryCommand {
    #[command(subcommand)]
    command: HistorySubcommand,
}

#[derive(Subcommand, Debug)]
enum HistorySubcommand {
    List,
    Preview {
        id: u64,
        /// Write the decoded image to this path.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Delete {
        id: u64,
    },
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let timeout = Duration::from_secs(cli.timeout_secs);
    let mut store = HistoryStore::new(FileStorage::new(&cli.history_file));

    match cli.command {
        Command::Ping => run_ping(&cli.endpoint, timeout).await,
        Command::Login { username, password } => {
            let mut session = Session::new();
            session.login(&username, &password)?;
            println!("Logged in as {}", session.username().unwrap_or_default());
            Ok(())
        }
        Command::Logout => {
            let mut session = Session::new();
            session.logout();
            println!("Logged out");
            Ok(())
        }
        Command::Predict(args) => run_predict(&cli.endpoint, timeout, &mut store, args).await,
        Command::History(history) => run_history(&mut store, history),
    }
}

async fn run_ping(endpoint: &str, timeout: Duration) -> Result<(), CliError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(health_url(endpoint)).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn run_predict(
    endpoint: &str,
    timeout: Duration,
    store: &mut HistoryStore<FileStorage>,
    args: PredictArgs,
) -> Result<(), CliError> {
    let image = match (&args.file, &args.data_url) {
        (Some(path), _) => CapturedImage::from_path(path)?,
        (None, Some(raw)) => CapturedImage::from_data_url(raw)?,
        (None, None) => return Err(CaptureError::EmptyImage.into()),
    };

    let predictor: Box<dyn Predictor> = if args.stub {
        Box::new(StubPredictor { age: args.stub_age })
    } else {
        Box::new(HttpPredictor::new(endpoint, timeout)?)
    };

    let entry = capture::predict_and_record(predictor.as_ref(), store, &image, args.shape).await?;
    println!("Predicted Age: {}", render::number(entry.age()));
    if let records::HistoryEntry::Scored(scored) = &entry {
        println!("Confidence: {}%", render::number(&scored.confidence));
    }
    Ok(())
}

fn run_history(store: &mut HistoryStore<FileStorage>, history: HistoryCommand) -> Result<(), CliError> {
    match history.command {
        HistorySubcommand::List => {
            for line in render::history_lines(&store.load()?) {
                println!("{line}");
            }
            Ok(())
        }
        HistorySubcommand::Preview { id, out } => {
            let entry = store.preview(id)?.ok_or(CliError::NotFound(id))?;
            println!("{}", render::preview(&entry));
            if let Some(path) = out {
                let image = DataUrl::parse(entry.image())?;
                std::fs::write(&path, &image.bytes)
                    .map_err(|source| CliError::Write { path: path.display().to_string(), source })?;
                println!("Image written to {}", path.display());
            }
            Ok(())
        }
        HistorySubcommand::Delete { id } => {
            let removed = store.delete(id)?;
            if removed == 0 {
                println!("No history entry with id {id}; nothing deleted");
                return Ok(());
            }
            println!("Deleted {removed} entr{}", if removed == 1 { "y" } else { "ies" });
            Ok(())
        }
        HistorySubcommand::Clear => {
            store.clear()?;
            println!("History cleared");
            Ok(())
        }
    }
}

/// Health route on the same host as the predict endpoint.
fn health_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    let base = trimmed.strip_suffix("/predict").unwrap_or(trimmed);
    format!("{base}/health")
}
