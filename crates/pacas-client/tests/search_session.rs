//! Integration tests for `SearchSession` driving a `wiremock` backend:
//! first search, "Show More" merges, and the empty-page skip loop.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pacas_client::{ClientError, LoadMorePolicy, LoadOutcome, PacasClient, SearchSession};
use pacas_core::{SearchParams, SortKey};

fn test_client(server: &MockServer) -> PacasClient {
    PacasClient::with_base_url(&server.uri(), 5, "pacas-test/0.1")
        .expect("failed to build test PacasClient")
}

fn fast_policy(max_empty_page_skips: u32) -> LoadMorePolicy {
    LoadMorePolicy {
        empty_page_delay: Duration::from_millis(1),
        max_empty_page_skips,
    }
}

fn listings(range: std::ops::RangeInclusive<u32>) -> Vec<serde_json::Value> {
    range
        .map(|n| {
            json!({
                "title": format!("Property {n}"),
                "price": format!("£{},000", 100 + n),
                "specs": format!("{} bed", n % 4 + 1),
                "url": format!("https://www.zoopla.co.uk/for-sale/details/{n}"),
                "source": "Zoopla"
            })
        })
        .collect()
}

fn page(range: std::ops::RangeInclusive<u32>, current: u32, total: u32) -> serde_json::Value {
    json!({
        "listings": listings(range),
        "total_found": 60,
        "total_pages": total,
        "current_page": current
    })
}

async fn mount_first_page(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_next_page(server: &MockServer, page_no: u32, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/search/next-page"))
        .and(body_partial_json(json!({ "current_page": page_no })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_then_show_more_merges_pages() {
    let server = MockServer::start().await;
    mount_first_page(&server, page(1..=13, 1, 3)).await;
    mount_next_page(&server, 2, page(14..=20, 2, 3)).await;

    let client = test_client(&server);
    let mut session = SearchSession::new(6);
    let stats = session
        .search(&client, &SearchParams::new("Leeds"))
        .await
        .unwrap();
    assert_eq!(stats.added, 13);
    assert_eq!(session.page_count(), 3);
    assert_eq!(session.page(3).len(), 1);
    assert_eq!(session.results_summary(), "Found 60 properties");
    assert!(!session.show_more_visible());

    assert!(session.go_to_page(3));
    assert!(session.show_more_visible());

    let outcome = session.load_more(&client, &fast_policy(5)).await.unwrap();
    assert_eq!(
        outcome,
        LoadOutcome::Appended {
            added: 7,
            has_more: true
        }
    );
    assert_eq!(session.held(), 20);
    assert_eq!(session.backend_page(), 2);
    assert_eq!(session.current_page(), 3);
    assert!(!session.show_more_visible());
    assert_eq!(session.results_summary(), "Found 20 properties");
}

#[tokio::test]
async fn null_listing_entries_are_skipped_not_fatal() {
    let server = MockServer::start().await;
    let mut entries = listings(1..=2);
    entries.insert(1, serde_json::Value::Null);
    mount_first_page(
        &server,
        json!({
            "listings": entries,
            "total_found": 3,
            "total_pages": 1,
            "current_page": 1
        }),
    )
    .await;

    let mut session = SearchSession::new(6);
    let stats = session
        .search(&test_client(&server), &SearchParams::new("Leeds"))
        .await
        .unwrap();
    assert_eq!(stats.added, 2);
    assert_eq!(stats.skipped_invalid, 1);
    assert_eq!(session.held(), 2);
}

#[tokio::test]
async fn invalid_location_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(1..=1, 1, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = SearchSession::new(6);
    let result = session
        .search(&test_client(&server), &SearchParams::new("Atlantis"))
        .await;
    assert!(
        matches!(result, Err(ClientError::Validation(ref e)) if e.field == "location"),
        "got: {result:?}"
    );
    assert!(session.params().is_none());
}

#[tokio::test]
async fn search_sends_normalised_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(json!({
            "location": "SW1A 1AA",
            "keywords": "garden",
            "sort_by": "price_asc"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(1..=3, 1, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let params = SearchParams {
        keywords: "  garden ".to_owned(),
        sort_by: SortKey::PriceAsc,
        ..SearchParams::new("sw1a 1aa")
    };
    let mut session = SearchSession::new(6);
    session.search(&test_client(&server), &params).await.unwrap();
    assert_eq!(session.visible()[0].title, "Property 1");
}

#[tokio::test]
async fn empty_pages_are_skipped_until_listings_arrive() {
    let server = MockServer::start().await;
    mount_first_page(&server, page(1..=6, 1, 5)).await;
    mount_next_page(
        &server,
        2,
        json!({ "listings": [], "total_pages": 5, "current_page": 2 }),
    )
    .await;
    mount_next_page(
        &server,
        3,
        json!({
            "listings": [{ "title": "", "price": "", "url": "" }],
            "total_pages": 5,
            "current_page": 3
        }),
    )
    .await;
    mount_next_page(&server, 4, page(7..=9, 4, 5)).await;

    let client = test_client(&server);
    let mut session = SearchSession::new(6);
    session
        .search(&client, &SearchParams::new("Leeds"))
        .await
        .unwrap();

    let outcome = session.load_more(&client, &fast_policy(5)).await.unwrap();
    assert_eq!(
        outcome,
        LoadOutcome::Appended {
            added: 3,
            has_more: true
        }
    );
    assert_eq!(session.backend_page(), 4);
    assert_eq!(session.held(), 9);
}

#[tokio::test]
async fn empty_page_skips_stop_at_configured_maximum() {
    let server = MockServer::start().await;
    mount_first_page(&server, page(1..=6, 1, 50)).await;

    Mock::given(method("POST"))
        .and(path("/api/search/next-page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "listings": [],
            "total_pages": 50,
            "has_next_page": true
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = SearchSession::new(6);
    session
        .search(&client, &SearchParams::new("Leeds"))
        .await
        .unwrap();

    let outcome = session.load_more(&client, &fast_policy(2)).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Exhausted);
    assert!(!session.is_loading());
    assert_eq!(session.backend_page(), 4, "pages 2, 3 and 4 were tried");
    assert_eq!(session.held(), 6);
}

#[tokio::test]
async fn failed_load_more_clears_busy_flag_and_keeps_listings() {
    let server = MockServer::start().await;
    mount_first_page(&server, page(1..=6, 1, 3)).await;

    Mock::given(method("POST"))
        .and(path("/api/search/next-page"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&json!({
            "error": "Failed to load more results"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = SearchSession::new(6);
    session
        .search(&client, &SearchParams::new("Leeds"))
        .await
        .unwrap();

    let result = session.load_more(&client, &fast_policy(5)).await;
    assert!(
        matches!(result, Err(ClientError::Api { status: 400, .. })),
        "got: {result:?}"
    );
    assert!(!session.is_loading());
    assert_eq!(session.held(), 6);
    assert_eq!(session.backend_page(), 1);
}

#[tokio::test]
async fn last_backend_page_makes_load_more_a_no_op() {
    let server = MockServer::start().await;
    mount_first_page(&server, page(1..=4, 1, 1)).await;

    let client = test_client(&server);
    let mut session = SearchSession::new(6);
    session
        .search(&client, &SearchParams::new("Leeds"))
        .await
        .unwrap();

    assert!(!session.has_more());
    let outcome = session.load_more(&client, &fast_policy(5)).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Exhausted);
}
