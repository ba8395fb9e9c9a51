use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["pacas"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn search_defaults_match_form_defaults() {
    let cli = Cli::try_parse_from(["pacas", "search", "--location", "Leeds"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            ref location,
            site: Site::Zoopla,
            listing_type: ListingType::Sale,
            min_price: 0,
            max_price: 10_000_000,
            min_beds: 0,
            max_beds: 10,
            sort: SortKey::Newest,
            page: 1,
            more: 0,
            ..
        }) if location == "Leeds"
    ));
}

#[test]
fn search_parses_site_sort_and_paging() {
    let cli = Cli::try_parse_from([
        "pacas",
        "search",
        "--location",
        "M40",
        "--site",
        "combined",
        "--listing-type",
        "rent",
        "--sort",
        "price_desc",
        "--page",
        "3",
        "--more",
        "2",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            site: Site::Combined,
            listing_type: ListingType::Rent,
            sort: SortKey::PriceDesc,
            page: 3,
            more: 2,
            ..
        })
    ));
}

#[test]
fn search_rejects_unknown_site() {
    let result = Cli::try_parse_from([
        "pacas",
        "search",
        "--location",
        "Leeds",
        "--site",
        "onthemarket",
    ]);
    assert!(result.is_err());
}

#[test]
fn search_requires_location() {
    assert!(Cli::try_parse_from(["pacas", "search"]).is_err());
}

#[test]
fn view_parses_contact_flags() {
    let cli = Cli::try_parse_from([
        "pacas",
        "view",
        "--url",
        "https://www.zoopla.co.uk/to-rent/details/1",
        "--email",
        "jo@example.com",
        "--callback",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::View {
            email: Some(ref e),
            phone: None,
            callback: true,
            ..
        }) if e == "jo@example.com"
    ));
}

#[test]
fn prices_defaults_to_zoopla_sale() {
    let cli = Cli::try_parse_from(["pacas", "prices"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Prices {
            site: Site::Zoopla,
            listing_type: ListingType::Sale
        })
    ));
}

#[test]
fn login_takes_password_flag() {
    let cli = Cli::try_parse_from([
        "pacas",
        "login",
        "--email",
        "jo@example.com",
        "--password",
        "correct horse",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Login { ref email, .. }) if email == "jo@example.com"
    ));
}

#[test]
fn parses_logout_and_whoami() {
    let cli = Cli::try_parse_from(["pacas", "logout"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Logout)));
    let cli = Cli::try_parse_from(["pacas", "whoami"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Whoami)));
}

#[test]
fn register_requires_name_and_phone() {
    let result = Cli::try_parse_from([
        "pacas",
        "register",
        "--email",
        "jo@example.com",
        "--password",
        "correct horse",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_favorites_subcommands() {
    let cli = Cli::try_parse_from(["pacas", "favorites", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Favorites {
            command: FavoritesCommands::List
        })
    ));

    let cli = Cli::try_parse_from([
        "pacas",
        "favorites",
        "check",
        "--url",
        "https://www.rightmove.co.uk/properties/9",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Favorites {
            command: FavoritesCommands::Check { ref url }
        }) if url.ends_with("/9")
    ));
}
