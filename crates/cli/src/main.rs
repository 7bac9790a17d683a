//! Open Market CLI - shop from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password may also come from OPEN_MARKET_PASSWORD)
//! om login -u buyer1 -p 'Abc12345'
//!
//! # Browse
//! om products list --page 2
//! om products show 42
//!
//! # Cart
//! om cart add 42 --quantity 2
//! om cart list
//! om cart inc 7
//! om cart remove 7 --yes
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `whoami` - Session management
//! - `signup`, `check-username` - Buyer registration
//! - `products list|show` - Catalog
//! - `cart list|add|inc|dec|remove` - Shopping cart

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use open_market_storefront::pages::Step;
use open_market_storefront::session::FileStore;
use open_market_storefront::{AppError, OpenMarketClient, Session, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "om")]
#[command(author, version, about = "Open Market storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long, env = "OPEN_MARKET_PASSWORD", hide_env_values = true)]
        password: String,

        /// Page you came from, used to pick where to continue
        #[arg(long)]
        referrer: Option<String>,

        /// Host name of the storefront site, for judging the referrer
        #[arg(long, default_value = "localhost")]
        site_host: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Register a buyer account
    Signup(commands::auth::SignupArgs),
    /// Check whether a username is free
    CheckUsername {
        /// Username to check
        username: String,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List one page of products
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show product details
    Show {
        /// Product id
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and the order summary
    List,
    /// Add a product to the cart
    Add {
        /// Product id
        product_id: String,

        /// Units to add (at most the stock)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Add one unit to a cart line
    Inc {
        /// Cart line id
        cart_id: i64,
    },
    /// Remove one unit from a cart line
    Dec {
        /// Cart line id
        cart_id: i64,
    },
    /// Delete a cart line
    Remove {
        /// Cart line id
        cart_id: i64,

        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Warnings and errors become Sentry events, info and debug breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "open_market_storefront=info,open_market_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        e.report();
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

fn build_client(config: &StorefrontConfig) -> Result<OpenMarketClient, AppError> {
    let store = FileStore::open(config.session_path())?;
    let session = Session::persistent(Arc::new(store));
    Ok(OpenMarketClient::new(&config.api, session)?)
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), AppError> {
    let client = build_client(config)?;

    match cli.command {
        Commands::Login {
            username,
            password,
            referrer,
            site_host,
        } => {
            commands::auth::login(&client, &username, &password, referrer.as_deref(), &site_host)
                .await?;
        }
        Commands::Logout => commands::auth::logout(&client)?,
        Commands::Whoami => commands::auth::whoami(&client),
        Commands::Signup(args) => commands::auth::signup(&client, args).await?,
        Commands::CheckUsername { username } => {
            commands::auth::check_username(&client, &username).await?;
        }
        Commands::Products { action } => match action {
            ProductsAction::List { page } => commands::products::list(&client, page).await?,
            ProductsAction::Show { id } => commands::products::show(&client, &id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(client).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(client, &product_id, quantity).await?,
            CartAction::Inc { cart_id } => {
                commands::cart::step(client, cart_id, Step::Increment).await?;
            }
            CartAction::Dec { cart_id } => {
                commands::cart::step(client, cart_id, Step::Decrement).await?;
            }
            CartAction::Remove { cart_id, yes } => {
                commands::cart::remove(client, cart_id, yes).await?;
            }
        },
    }
    Ok(())
}
