mod account;
mod favorites;
mod search;
mod view;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use pacas_client::{JsonFileStore, LeadGate, PacasClient};
use pacas_core::{ListingType, Site, SortKey};
use tracing_subscriber::EnvFilter;

use crate::favorites::FavoritesCommands;

#[derive(Debug, Parser)]
#[command(name = "pacas")]
#[command(about = "Search UK property listings through the PacasHomes backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search listings and print one display page
    Search {
        /// City, area, county, or postcode
        #[arg(long)]
        location: String,
        /// zoopla, rightmove, openrent, or combined
        #[arg(long, default_value = "zoopla")]
        site: Site,
        /// sale or rent
        #[arg(long, default_value = "sale")]
        listing_type: ListingType,
        #[arg(long, default_value = "0")]
        min_price: u64,
        #[arg(long, default_value = "10000000")]
        max_price: u64,
        #[arg(long, default_value = "0")]
        min_beds: u32,
        #[arg(long, default_value = "10")]
        max_beds: u32,
        #[arg(long, default_value = "")]
        keywords: String,
        /// price_asc, price_desc, beds_asc, beds_desc, newest, or oldest
        #[arg(long, default_value = "newest")]
        sort: SortKey,
        /// Display page to print (1-based)
        #[arg(long, default_value = "1")]
        page: usize,
        /// Extra backend pages to load before printing ("Show More")
        #[arg(long, default_value = "0")]
        more: u32,
    },
    /// Open a listing through the contact gate and print its URL
    View {
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        price: String,
        /// Source site name recorded with the lead
        #[arg(long, default_value = "")]
        site: String,
        /// Contact email, required the first time
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Ask an agent to call back
        #[arg(long)]
        callback: bool,
    },
    /// Show the min/max price presets for a site and listing type
    Prices {
        #[arg(long, default_value = "zoopla")]
        site: Site,
        #[arg(long, default_value = "sale")]
        listing_type: ListingType,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PACAS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account; prompts for the emailed verification code
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PACAS_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },
    /// Manage saved properties (requires login)
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = pacas_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("pacas: no command given; run `pacas --help` for usage");
        return Ok(());
    };

    let client = Arc::new(PacasClient::new(&config)?);
    let mut gate = LeadGate::load(Arc::clone(&client), JsonFileStore::new(&config.state_path))?;
    tracing::debug!(env = %config.env, base_url = %client.base_url(), "client ready");

    match command {
        Commands::Search {
            location,
            site,
            listing_type,
            min_price,
            max_price,
            min_beds,
            max_beds,
            keywords,
            sort,
            page,
            more,
        } => {
            let params = pacas_core::SearchParams {
                site,
                location,
                listing_type,
                min_price,
                max_price,
                min_beds,
                max_beds,
                keywords,
                sort_by: sort,
                current_page: 1,
            };
            search::run_search(&client, &config, &params, page, more).await?;
        }
        Commands::View {
            url,
            title,
            price,
            site,
            email,
            phone,
            name,
            callback,
        } => {
            let listing = pacas_core::Listing {
                title,
                price,
                url,
                source: site,
                ..pacas_core::Listing::default()
            };
            let contact = email.map(|email| pacas_client::ContactDetails {
                email,
                phone,
                name,
                wants_callback: callback,
            });
            let result = view::run_view(&mut gate, &listing, contact.as_ref());
            gate.flush_tracking().await;
            result?;
        }
        Commands::Login { email, password } => {
            account::run_login(&mut gate, &email, &password).await?;
        }
        Commands::Logout => account::run_logout(&mut gate).await?,
        Commands::Whoami => account::run_whoami(&gate).await?,
        Commands::Register {
            email,
            password,
            name,
            phone,
        } => {
            let details = pacas_client::AccountDetails {
                email,
                password,
                name,
                phone,
            };
            account::run_register(&mut gate, &details).await?;
        }
        Commands::Favorites { command } => favorites::run(&client, command).await?,
        Commands::Prices { site, listing_type } => search::run_prices(site, listing_type),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
