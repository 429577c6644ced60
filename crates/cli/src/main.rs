//! ReelCart CLI - Inspect and drive a cart backend.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart and its total
//! reelcart list
//!
//! # Add a movie
//! reelcart add --id 3 --title "Heat" --price 7.50
//!
//! # Pay for everything in the cart
//! reelcart checkout --first-name Ada --last-name Lovelace --email ada@example.com
//! ```
//!
//! # Commands
//!
//! - `list` - Show cart contents and total
//! - `count` - Show the number of items
//! - `status` - Check whether a movie is in the cart
//! - `add` / `remove` / `empty` - Change the cart
//! - `total` - Show the authoritative checkout total
//! - `checkout` - Complete the purchase
//!
//! The backend URL comes from `REELCART_API_URL` or `--api-url`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use reelcart_client::ClientConfig;
use reelcart_core::{MovieId, Price};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "reelcart")]
#[command(author, version, about = "ReelCart cart tools")]
struct Cli {
    /// Cart backend URL (overrides `REELCART_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show cart contents and total
    List,
    /// Show the number of items in the cart
    Count,
    /// Check whether a movie is in the cart
    Status {
        /// Movie ID
        id: MovieId,
    },
    /// Add a movie to the cart
    Add {
        /// Movie ID
        #[arg(long)]
        id: MovieId,

        /// Movie title
        #[arg(long)]
        title: String,

        /// Price, e.g. `9.99`
        #[arg(long)]
        price: Price,

        /// Poster image URL
        #[arg(long)]
        image: Option<String>,

        /// Release date as shown in listings
        #[arg(long)]
        release_date: Option<String>,
    },
    /// Remove a movie from the cart
    Remove {
        /// Movie ID
        id: MovieId,
    },
    /// Remove every movie from the cart
    Empty,
    /// Show the checkout total
    Total,
    /// Complete the purchase
    Checkout {
        /// Buyer first name
        #[arg(long)]
        first_name: String,

        /// Buyer last name
        #[arg(long)]
        last_name: String,

        /// Buyer email address
        #[arg(long)]
        email: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration is needed for Sentry, which must be set up before tracing
    let config = ClientConfig::from_env_with_api_url(cli.api_url.as_deref());
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "reelcart_client=info,reelcart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = commands::connect(config)?;

    match command {
        Commands::List => commands::cart::list(&app).await?,
        Commands::Count => commands::cart::count(&app).await?,
        Commands::Status { id } => commands::cart::status(&app, id).await?,
        Commands::Add {
            id,
            title,
            price,
            image,
            release_date,
        } => {
            commands::cart::add(&app, id, title, price, image, release_date).await?;
        }
        Commands::Remove { id } => commands::cart::remove(&app, id).await?,
        Commands::Empty => commands::cart::empty(&app).await?,
        Commands::Total => commands::checkout::total(&app).await?,
        Commands::Checkout {
            first_name,
            last_name,
            email,
        } => commands::checkout::complete(&app, &first_name, &last_name, &email).await?,
    }
    Ok(())
}
