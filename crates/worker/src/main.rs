use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use stocklens_core::config::Settings;
use stocklens_core::error::{error_kind, ErrorKind};
use stocklens_core::lookup::{LookupParams, StockLookup};
use stocklens_core::sentiment::{AnthropicClassifier, LexiconClassifier, SentimentClassifier};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClassifierKind {
    /// Offline lexicon scorer.
    Lexicon,
    /// Anthropic Messages API (needs ANTHROPIC_API_KEY).
    Anthropic,
}

#[derive(Debug, Parser)]
#[command(
    name = "stocklens_worker",
    about = "Price, beta and post-sentiment summary for one ticker"
)]
struct Args {
    /// JSON file with access_token, consumer_key, access_token_secret, consumer_secret and
    /// STOCK_API_KEY.
    #[arg(long)]
    credentials: PathBuf,

    /// Ticker to look up.
    #[arg(long)]
    symbol: String,

    /// Lookback in days.
    #[arg(long, default_value_t = stocklens_core::lookup::DEFAULT_RANGE_DAYS)]
    range: u32,

    /// Bar interval in seconds.
    #[arg(long, default_value_t = stocklens_core::lookup::DEFAULT_INTERVAL_SECS)]
    interval: u32,

    /// Reference index for beta.
    #[arg(long, default_value = stocklens_core::lookup::DEFAULT_EXCHANGE)]
    exchange: String,

    /// Maximum number of posts to score.
    #[arg(long, default_value_t = stocklens_core::social::DEFAULT_POST_LIMIT)]
    post_limit: usize,

    #[arg(long, value_enum, default_value_t = ClassifierKind::Lexicon)]
    classifier: ClassifierKind,

    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn params(&self) -> LookupParams {
        LookupParams {
            symbol: self.symbol.trim().to_ascii_uppercase(),
            range_days: self.range,
            interval_secs: self.interval,
            exchange: self.exchange.trim().to_string(),
            post_limit: self.post_limit,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(err) => {
            eprintln!("invalid environment: {err:#}");
            return ExitCode::from(2);
        }
    };
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match run(&args, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            let kind = error_kind(&err);
            tracing::error!(
                symbol = %args.symbol,
                ?kind,
                error = %format!("{err:#}"),
                "lookup failed"
            );
            ExitCode::from(exit_code(kind))
        }
    }
}

async fn run(args: &Args, settings: &Settings) -> anyhow::Result<()> {
    let params = args.params();

    // Credentials are validated before any client touches the network.
    let credentials = stocklens_core::credentials::load_credentials(&args.credentials)?;
    let classifier = build_classifier(args.classifier, settings)?;

    let lookup = StockLookup::from_credentials(&credentials, settings, classifier).await?;
    let report = lookup.run(&params).await?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize report")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), symbol = %params.symbol, "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn build_classifier(
    kind: ClassifierKind,
    settings: &Settings,
) -> anyhow::Result<Box<dyn SentimentClassifier>> {
    Ok(match kind {
        ClassifierKind::Lexicon => Box::new(LexiconClassifier::new()),
        ClassifierKind::Anthropic => Box::new(AnthropicClassifier::from_settings(settings)?),
    })
}

fn exit_code(kind: Option<ErrorKind>) -> u8 {
    match kind {
        Some(ErrorKind::Config) => 2,
        Some(ErrorKind::Fetch) => 3,
        Some(ErrorKind::Parse) => 4,
        Some(ErrorKind::InsufficientData) => 5,
        None => 1,
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
