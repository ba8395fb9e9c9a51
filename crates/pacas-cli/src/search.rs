//! `search` and `prices` command handlers.

use pacas_client::{LoadMorePolicy, LoadOutcome, PacasClient, SearchSession};
use pacas_core::{price_options, AppConfig, Listing, ListingType, SearchParams, Site};

/// Run a search, optionally "Show More" `more` times, then print display page `page`.
///
/// # Errors
///
/// Returns an error if the form fails validation or the backend call fails.
/// A failed "Show More" is reported and the listings already held are printed.
pub(crate) async fn run_search(
    client: &PacasClient,
    config: &AppConfig,
    params: &SearchParams,
    page: usize,
    more: u32,
) -> anyhow::Result<()> {
    let mut session = SearchSession::new(config.page_size);
    session.search(client, params).await?;

    let policy = LoadMorePolicy::from_config(config);
    for _ in 0..more {
        match session.load_more(client, &policy).await {
            Ok(LoadOutcome::Appended { added, has_more }) => {
                eprintln!("loaded {added} more listings");
                if !has_more {
                    break;
                }
            }
            Ok(LoadOutcome::Empty | LoadOutcome::Exhausted) => {
                eprintln!("no more listings available");
                break;
            }
            Err(e) => {
                eprintln!("error loading more results: {e}");
                break;
            }
        }
    }

    println!("{}", session.results_summary());
    if let Some(stats) = session.site_stats() {
        for (site, stat) in stats {
            println!(
                "  {site}: {} listings, {} pages ({})",
                stat.listings, stat.total_pages, stat.source
            );
        }
    }
    if session.page_count() == 0 {
        return Ok(());
    }

    if !session.go_to_page(page) {
        anyhow::bail!(
            "page {page} is out of range; {} pages of results are loaded",
            session.page_count()
        );
    }

    println!();
    let first_index = (page - 1) * config.page_size + 1;
    for (i, listing) in session.visible().into_iter().enumerate() {
        print_card(first_index + i, listing);
    }
    println!(
        "Page {} of {}",
        session.current_page(),
        session.page_count()
    );
    if session.show_more_visible() && session.has_more() {
        println!("More results are available: re-run with --more {}", more + 1);
    }

    Ok(())
}

fn print_card(index: usize, listing: &Listing) {
    println!("[{index}] {}", listing.display_title());
    let mut facts = vec![listing.price.as_str()];
    if !listing.specs.trim().is_empty() {
        facts.push(listing.specs.as_str());
    }
    if !listing.source.trim().is_empty() {
        facts.push(listing.source.as_str());
    }
    println!("    {}", facts.join(" | "));
    if !listing.address.trim().is_empty() && listing.address != listing.display_title() {
        println!("    {}", listing.address);
    }
    if !listing.description.trim().is_empty() {
        println!("    {}", truncate(&listing.description, 120));
    }
    println!("    image: {}", listing.image_or_placeholder());
    println!("    {}", listing.url);
    println!();
}

fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Print the price presets offered for `site` and `listing_type`.
pub(crate) fn run_prices(site: Site, listing_type: ListingType) {
    let presets = price_options(site, listing_type);
    println!("Minimum price ({site}, {listing_type}):");
    for option in &presets.min {
        println!("  {:>10}  {}", option.value, option.label);
    }
    println!("Maximum price ({site}, {listing_type}):");
    for option in &presets.max {
        println!("  {:>10}  {}", option.value, option.label);
    }
}
