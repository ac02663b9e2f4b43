//! Mavi CLI - cart and catalog access from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart saved by the storefront
//! mavi cart show
//!
//! # Add two of product 11, then change it to five
//! mavi cart add 11 -q 2
//! mavi cart set 11 5
//!
//! # Search the catalog, cheapest first
//! mavi catalog search lamp --sort price-low
//!
//! # Work on the cart of a storefront session
//! mavi --shopper 3f2a... cart show
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and edit the persisted cart
//! - `favorites` - Inspect and edit the persisted favorites
//! - `catalog` - Browse and search the catalog, including admin edits
//!
//! Slots live in the same storage as the server's (`MAVI_DATA_DIR`, or
//! `--data-dir`). Without `--shopper` the CLI uses the unscoped cart and
//! favorites slots; with it, the slots of that storefront shopper (the
//! `shopper` field of `GET /api/cart`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mavi_storefront::catalog::{PriceRange, SortBy};
use mavi_storefront::config::StorefrontConfig;
use mavi_storefront::storage::{scoped_slot, validate_slot};

mod commands;

#[derive(Parser)]
#[command(name = "mavi")]
#[command(author, version, about = "Mavi Gadget cart and catalog tools")]
struct Cli {
    /// Directory holding the cart storage (overrides `MAVI_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storefront shopper id whose cart and favorites to use
    #[arg(long, global = true)]
    shopper: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect and edit the persisted favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Browse and search the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show line items and totals
    Show,
    /// Add a product (zero or less removes it)
    Add {
        /// Product id
        id: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Set a line's quantity (zero or less removes it)
    Set {
        /// Product id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Product id
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Print the total item count
    Count,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite products
    Show,
    /// Favorite a product
    Add {
        /// Product id
        id: String,
    },
    /// Unfavorite a product
    Remove {
        /// Product id
        id: String,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Only products in this category slug
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Search products by text
    Search {
        /// Text to match against name, description, tags and category
        text: String,

        /// Result order (`relevance`, `price-low`, `price-high`, `rating`, `newest`)
        #[arg(short, long, default_value = "relevance")]
        sort: SortBy,

        /// Price bucket (`under25`, `from25-to50`, `from50-to100`, `over100`)
        #[arg(short, long)]
        price: Option<PriceRange>,

        /// Only products in stock
        #[arg(long)]
        in_stock: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing; logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => print_output(&output),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_output(output: &str) {
    println!("{output}");
}

async fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(id) = &cli.shopper {
        validate_slot(&scoped_slot(&config.cart_slot, id))?;
    }
    let shopper = cli.shopper.as_deref();
    let catalog = commands::load_catalog(&config).await;

    let output = match cli.command {
        Commands::Cart { action } => {
            let mut cart = commands::cart::open(&config, shopper).await;
            match action {
                CartAction::Show => commands::cart::show(&cart),
                CartAction::Add { id, quantity } => {
                    commands::cart::add(&mut cart, &catalog, &id, quantity).await?
                }
                CartAction::Set { id, quantity } => {
                    commands::cart::set(&mut cart, &id, quantity).await?
                }
                CartAction::Remove { id } => commands::cart::remove(&mut cart, &id).await?,
                CartAction::Clear => commands::cart::clear(&mut cart).await,
                CartAction::Count => cart.item_count().to_string(),
            }
        }
        Commands::Favorites { action } => {
            let mut favorites = commands::favorites::open(&config, shopper).await;
            match action {
                FavoritesAction::Show => commands::favorites::show(&favorites, &catalog),
                FavoritesAction::Add { id } => {
                    commands::favorites::add(&mut favorites, &catalog, &id).await?
                }
                FavoritesAction::Remove { id } => {
                    commands::favorites::remove(&mut favorites, &catalog, &id).await?
                }
            }
        }
        Commands::Catalog { action } => match action {
            CatalogAction::List { category } => {
                commands::catalog::list(&catalog, category.as_deref())
            }
            CatalogAction::Search {
                text,
                sort,
                price,
                in_stock,
            } => commands::catalog::search(&catalog, text, sort, price, in_stock),
        },
    };
    Ok(output)
}
