//! Storefront CLI - Lightweight client for a headless Drupal Commerce backend
//!
//! Drives the backend's session, cart, order and checkout endpoints from the
//! terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_cli::api;
use storefront_cli::auth::{self, RegisterData};
use storefront_cli::config::Config;

#[derive(Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Lightweight CLI client for a headless Drupal Commerce storefront", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL (overrides STOREFRONT_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the backend base URL in the config file
    SetUrl {
        /// Backend base URL, e.g. https://shop.example.com
        url: String,
    },

    /// Log in with username and password
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Log out and clear the stored session
    Logout,

    /// Register a new account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        mail: String,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Show current session status
    Status,

    /// Show the current user profile
    Whoami,

    /// Cart operations
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },

    /// Show a placed order (confirmation view)
    Order {
        /// Order id
        id: String,
    },

    /// PayPal checkout for the current cart
    Checkout {
        #[command(subcommand)]
        command: CheckoutCommands,
    },
}

#[derive(Subcommand)]
enum CartCommands {
    /// Show the current cart
    Show,

    /// Add a product variation to the cart
    Add {
        /// Product variation id
        product_id: String,

        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },

    /// Remove a line item (id from `cart show` output)
    Remove {
        order_item_id: String,
    },

    /// Change a line item quantity (id from `cart show` output)
    Update {
        order_item_id: String,

        quantity: u32,
    },

    /// Remove every item from the cart
    Clear,
}

#[derive(Subcommand)]
enum CheckoutCommands {
    /// Create a PayPal order for the current cart
    Create,

    /// Capture an approved PayPal order
    Capture {
        paypal_order_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let base = cli.base_url.as_deref();

    match cli.command {
        Commands::SetUrl { url } => {
            let mut config = Config::load()?;
            config.set_base_url(&url);
            config.save()?;
            println!("Base URL set to {}.", url.trim_end_matches('/'));
        }
        Commands::Login { username, password } => {
            tracing::info!("Logging in...");
            auth::login(base, &username, &password).await?;
        }
        Commands::Logout => {
            tracing::info!("Logging out...");
            auth::logout(base).await?;
        }
        Commands::Register {
            username,
            mail,
            password,
            first_name,
            last_name,
        } => {
            let data = RegisterData {
                name: username,
                mail,
                pass: password,
                field_first_name: first_name,
                field_last_name: last_name,
            };
            auth::register(base, &data).await?;
        }
        Commands::Status => {
            auth::status(base).await?;
        }
        Commands::Whoami => {
            auth::whoami(base).await?;
        }
        Commands::Cart { command } => match command {
            CartCommands::Show => {
                api::show_cart(base).await?;
            }
            CartCommands::Add {
                product_id,
                quantity,
            } => {
                api::add_to_cart(base, &product_id, quantity).await?;
            }
            CartCommands::Remove { order_item_id } => {
                api::remove_from_cart(base, &order_item_id).await?;
            }
            CartCommands::Update {
                order_item_id,
                quantity,
            } => {
                api::update_quantity(base, &order_item_id, quantity).await?;
            }
            CartCommands::Clear => {
                api::clear_cart(base).await?;
            }
        },
        Commands::Order { id } => {
            api::show_order(base, &id).await?;
        }
        Commands::Checkout { command } => match command {
            CheckoutCommands::Create => {
                api::checkout_create(base).await?;
            }
            CheckoutCommands::Capture { paypal_order_id } => {
                api::checkout_capture(base, &paypal_order_id).await?;
            }
        },
    }

    Ok(())
}
