//! Favorites command handlers.

use clap::Subcommand;
use pacas_client::PacasClient;
use pacas_core::{Favorite, Listing};

/// Sub-commands available under `favorites`.
#[derive(Debug, Subcommand)]
pub enum FavoritesCommands {
    /// List saved properties
    List,
    /// Save a property
    Add {
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        price: String,
        #[arg(long, default_value = "")]
        image: String,
        #[arg(long, default_value = "")]
        site: String,
        /// Bedroom summary, e.g. "2 bed flat"
        #[arg(long, default_value = "")]
        bedrooms: String,
        /// Search location the property was found under
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Remove a saved property
    Remove {
        #[arg(long)]
        url: String,
    },
    /// Report whether a property is saved
    Check {
        #[arg(long)]
        url: String,
    },
}

pub(crate) async fn run(client: &PacasClient, command: FavoritesCommands) -> anyhow::Result<()> {
    match command {
        FavoritesCommands::List => {
            let favorites = client.favorites().await?;
            if favorites.is_empty() {
                println!("no saved properties");
                return Ok(());
            }
            for favorite in &favorites {
                let title = if favorite.property_title.is_empty() {
                    favorite.property_url.as_str()
                } else {
                    favorite.property_title.as_str()
                };
                println!("{title}");
                println!(
                    "    {} | {} | {}",
                    favorite.property_price, favorite.bedrooms, favorite.site
                );
                println!("    {}", favorite.property_url);
            }
        }
        FavoritesCommands::Add {
            url,
            title,
            price,
            image,
            site,
            bedrooms,
            location,
        } => {
            let listing = Listing {
                title,
                price,
                specs: bedrooms,
                image,
                source: site,
                url,
                ..Listing::default()
            };
            let favorite = Favorite::from_listing(&listing, &location);
            client.add_favorite(&favorite).await?;
            println!("saved {}", favorite.property_url);
        }
        FavoritesCommands::Remove { url } => {
            client.remove_favorite(&url).await?;
            println!("removed {url}");
        }
        FavoritesCommands::Check { url } => {
            let saved = client.is_favorite(&url).await?;
            println!("{}", if saved { "saved" } else { "not saved" });
        }
    }
    Ok(())
}
