//! RocketShoes cart CLI.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cart show
//!
//! # Add one unit of product 7
//! rs-cart add 7
//!
//! # Set product 7 to three units
//! rs-cart update 7 3
//!
//! # Remove product 7 entirely
//! rs-cart remove 7
//! ```
//!
//! Each invocation is one session: the cart is restored from the storage file,
//! the command runs, and the process exits. See `rocketshoes_cart::config` for
//! the environment variables read at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_cart::CartConfig;
use rocketshoes_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::Layer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes shopping cart")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart contents and total
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (zero or less is ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
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
///
/// Rejected operations log at `warn` and are expected, so only errors become events.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO | tracing::Level::DEBUG => {
            sentry_tracing::EventFilter::Breadcrumb
        }
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cart=info,rocketshoes_cli=info".into());

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match CartConfig::from_env() {
        Ok(config) => {
            // Sentry must be up before the subscriber so the layer has a client
            let _sentry_guard = init_sentry(&config);
            init_tracing(cli.json_logs);
            run(cli.command, &config).await
        }
        Err(e) => {
            init_tracing(cli.json_logs);
            Err(e.into())
        }
    };

    if let Err(e) = result {
        // Cart errors were already logged and shown by the store
        if e.is_reported() {
            tracing::debug!("Command failed: {e}");
        } else {
            tracing::error!("Command failed: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &CartConfig) -> Result<(), CommandError> {
    match command {
        Commands::Show => commands::cart::show(config),
        Commands::Add { product_id } => commands::cart::add(config, product_id).await,
        Commands::Remove { product_id } => commands::cart::remove(config, product_id),
        Commands::Update { product_id, amount } => {
            commands::cart::update(config, product_id, amount).await
        }
    }
}
