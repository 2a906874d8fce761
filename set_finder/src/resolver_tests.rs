//! Tests for the card resolver against a mock Scryfall.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{CardResolver, ResolveOptions, ResolveResult};
use crate::api::ScryfallClient;
use crate::config::ResolverConfig;
use crate::models::{CardEntry, Color, Rarity};

fn card_json(name: &str, set: &str, cn: &str, rarity: &str, games: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "set": set,
        "set_name": format!("Set {}", set.to_uppercase()),
        "set_type": "expansion",
        "collector_number": cn,
        "rarity": rarity,
        "colors": ["R"],
        "mana_cost": "{R}",
        "type_line": "Instant",
        "games": games
    })
}

fn paper(name: &str, set: &str, cn: &str) -> serde_json::Value {
    card_json(name, set, cn, "common", &["paper"])
}

fn list(data: Vec<serde_json::Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "object": "list",
        "has_more": false,
        "data": data
    }))
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(serde_json::json!({
        "object": "error",
        "status": 404,
        "code": "not_found",
        "details": "Your query didn't match any cards."
    }))
}

fn test_config() -> ResolverConfig {
    ResolverConfig {
        batch_size: 5,
        throttle: Duration::ZERO,
        max_rate_limit_retries: 3,
    }
}

async fn mock_search(server: &MockServer, query: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/cards/search"))
        .and(query_param("q", query))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Runs the blocking resolver off the async test runtime.
async fn run_resolver<F>(base_url: String, config: ResolverConfig, call: F) -> ResolveResult
where
    F: FnOnce(&CardResolver<'_>) -> ResolveResult + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let client = ScryfallClient::with_base_url(&base_url, "SetFinder-Test/1.0")
            .unwrap()
            .with_page_delay(Duration::ZERO);
        let resolver = CardResolver::new(&client, config);
        call(&resolver)
    })
    .await
    .unwrap()
}

fn found_names(result: &ResolveResult) -> Vec<&str> {
    result.found.iter().map(|c| c.name.as_str()).collect()
}

// ── end to end ───────────────────────────────────────────────────────

#[tokio::test]
async fn resolves_entries_with_quantities_and_reports_unfound() {
    let server = MockServer::start().await;

    mock_search(
        &server,
        "!\"Lightning Bolt\" OR !\"Sol Ring\" OR !\"NotACard123\"",
        list(vec![
            paper("Lightning Bolt", "lea", "161"),
            paper("Lightning Bolt", "m10", "146"),
            paper("Sol Ring", "lea", "270"),
        ]),
    )
    .await;
    mock_search(&server, "!\"NotACard123\"", not_found()).await;

    let entries = crate::list_parser::parse_card_list("4 Lightning Bolt\nSol Ring x1\nNotACard123");
    assert_eq!(entries.len(), 3);

    let result = run_resolver(server.uri(), test_config(), move |resolver| {
        resolver.resolve_entries(&entries, &ResolveOptions::default())
    })
    .await;

    assert_eq!(found_names(&result), vec!["Lightning Bolt", "Sol Ring"]);
    assert_eq!(result.found[0].quantity, 4);
    assert_eq!(result.found[1].quantity, 1);
    assert_eq!(result.unfound, vec!["NotACard123".to_string()]);
    assert_eq!(result.found[0].printings.len(), 2);
    assert_eq!(result.found[0].colors, vec![Color::Red]);
    assert_eq!(result.found[0].printings[0].rarity, Rarity::Common);
}

#[tokio::test]
async fn matches_input_case_insensitively() {
    let server = MockServer::start().await;
    mock_search(
        &server,
        "!\"lightning BOLT\"",
        list(vec![paper("Lightning Bolt", "lea", "161")]),
    )
    .await;

    let result = run_resolver(server.uri(), test_config(), |resolver| {
        resolver.resolve(&["lightning BOLT"], &ResolveOptions::default())
    })
    .await;

    assert_eq!(found_names(&result), vec!["Lightning Bolt"]);
    assert!(result.unfound.is_empty());
}

#[tokio::test]
async fn duplicate_input_resolves_once() {
    let server = MockServer::start().await;
    mock_search(&server, "!\"Sol Ring\"", list(vec![paper("Sol Ring", "lea", "270")])).await;

    let entries = vec![CardEntry::new("Sol Ring", 2), CardEntry::new("sol ring", 5)];
    let result = run_resolver(server.uri(), test_config(), move |resolver| {
        resolver.resolve_entries(&entries, &ResolveOptions::default())
    })
    .await;

    assert_eq!(found_names(&result), vec!["Sol Ring"]);
    assert_eq!(result.found[0].quantity, 2);
    assert!(result.unfound.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// ── batching and fallback ────────────────────────────────────────────

#[tokio::test]
async fn every_name_is_found_or_unfound_exactly_once() {
    let server = MockServer::start().await;

    let names: Vec<String> = (1..=7).map(|i| format!("Card {i}")).collect();
    // Batch 1 knows cards 1 and 3, batch 2 knows card 6
    mock_search(
        &server,
        "!\"Card 1\" OR !\"Card 2\" OR !\"Card 3\" OR !\"Card 4\" OR !\"Card 5\"",
        list(vec![paper("Card 1", "aaa", "1"), paper("Card 3", "aaa", "3")]),
    )
    .await;
    mock_search(
        &server,
        "!\"Card 6\" OR !\"Card 7\"",
        list(vec![paper("Card 6", "bbb", "6")]),
    )
    .await;
    // The single-card retry finds card 4
    mock_search(&server, "!\"Card 4\"", list(vec![paper("Card 4", "ccc", "4")])).await;
    Mock::given(method("GET"))
        .and(path("/cards/search"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let input = names.clone();
    let result = run_resolver(server.uri(), test_config(), move |resolver| {
        resolver.resolve(&input, &ResolveOptions::default())
    })
    .await;

    assert_eq!(found_names(&result), vec!["Card 1", "Card 3", "Card 4", "Card 6"]);
    assert_eq!(result.unfound, vec!["Card 2", "Card 5", "Card 7"]);
    for name in &names {
        let in_found = result.found.iter().any(|c| &c.name == name);
        let in_unfound = result.unfound.contains(name);
        assert!(in_found ^ in_unfound, "{name} must be in exactly one list");
    }

    // 2 batch queries + 4 single retries
    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

#[tokio::test]
async fn failed_batch_falls_back_to_single_lookups() {
    let server = MockServer::start().await;
    mock_search(
        &server,
        "!\"Opt\" OR !\"Counterspell\"",
        ResponseTemplate::new(500),
    )
    .await;
    mock_search(&server, "!\"Opt\"", list(vec![paper("Opt", "xln", "65")])).await;
    mock_search(
        &server,
        "!\"Counterspell\"",
        list(vec![paper("Counterspell", "lea", "54")]),
    )
    .await;

    let result = run_resolver(server.uri(), test_config(), |resolver| {
        resolver.resolve(&["Opt", "Counterspell"], &ResolveOptions::default())
    })
    .await;

    assert_eq!(found_names(&result), vec!["Opt", "Counterspell"]);
    assert!(result.unfound.is_empty());
}

#[tokio::test]
async fn consecutive_calls_are_spaced_by_the_throttle() {
    let server = MockServer::start().await;
    mock_search(
        &server,
        "!\"Opt\" OR !\"Shock\"",
        list(vec![paper("Opt", "xln", "65"), paper("Shock", "m19", "156")]),
    )
    .await;
    mock_search(&server, "!\"Duress\"", list(vec![])).await;

    let throttle = Duration::from_millis(150);
    let config = ResolverConfig {
        batch_size: 2,
        throttle,
        ..test_config()
    };
    let started = std::time::Instant::now();
    let result = run_resolver(server.uri(), config, |resolver| {
        resolver.resolve(&["Opt", "Shock", "Duress"], &ResolveOptions::default())
    })
    .await;

    assert_eq!(found_names(&result), vec!["Opt", "Shock"]);
    assert_eq!(result.unfound, vec!["Duress"]);
    // Two batches plus the single retry for Duress
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert!(started.elapsed() >= throttle * 2);
}

#[tokio::test]
async fn network_failure_on_single_lookup_degrades_to_unfound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = run_resolver(server.uri(), test_config(), |resolver| {
        resolver.resolve(&["Opt"], &ResolveOptions::default())
    })
    .await;

    assert!(result.found.is_empty());
    assert_eq!(result.unfound, vec!["Opt".to_string()]);
}

// ── rate limiting ────────────────────────────────────────────────────

#[tokio::test]
async fn rate_limited_batch_is_retried_after_delay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mock_search(&server, "!\"Opt\"", list(vec![paper("Opt", "xln", "65")])).await;

    let started = std::time::Instant::now();
    let result = run_resolver(server.uri(), test_config(), |resolver| {
        resolver.resolve(&["Opt"], &ResolveOptions::default())
    })
    .await;

    assert_eq!(found_names(&result), vec!["Opt"]);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn persistent_rate_limit_gives_up_and_reports_unfound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .mount(&server)
        .await;

    let config = ResolverConfig {
        max_rate_limit_retries: 2,
        ..test_config()
    };
    let result = run_resolver(server.uri(), config, |resolver| {
        resolver.resolve(&["Opt"], &ResolveOptions::default())
    })
    .await;

    assert!(result.found.is_empty());
    assert_eq!(result.unfound, vec!["Opt".to_string()]);
    // (1 try + 2 retries) for the batch and again for the single lookup
    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

// ── card assembly ────────────────────────────────────────────────────

#[tokio::test]
async fn unique_sets_per_card_collapses_printings() {
    let server = MockServer::start().await;
    mock_search(
        &server,
        "!\"Path to Exile\"",
        list(vec![
            card_json("Path to Exile", "2xm", "25", "uncommon", &["paper"]),
            card_json("Path to Exile", "2xm", "333", "uncommon", &["paper"]),
            card_json("Path to Exile", "con", "15", "common", &["paper"]),
            card_json("Path to Exile", "prm", "1", "rare", &["mtgo"]),
        ]),
    )
    .await;

    let base_url = server.uri();
    let unique = run_resolver(base_url.clone(), test_config(), |resolver| {
        resolver.resolve(&["Path to Exile"], &ResolveOptions::default())
    })
    .await;
    let all = run_resolver(base_url, test_config(), |resolver| {
        resolver.resolve(
            &["Path to Exile"],
            &ResolveOptions {
                unique_sets_per_card: false,
            },
        )
    })
    .await;

    let unique_cns: Vec<_> = unique.found[0]
        .printings
        .iter()
        .map(|p| p.collector_number.as_str())
        .collect();
    assert_eq!(unique_cns, vec!["25", "15"]);

    // Every paper printing, the MTGO-only one stays out
    let all_cns: Vec<_> = all.found[0]
        .printings
        .iter()
        .map(|p| p.collector_number.as_str())
        .collect();
    assert_eq!(all_cns, vec!["25", "333", "15"]);
}

#[tokio::test]
async fn multi_faced_card_resolves_by_face_name_with_union_of_colors() {
    let server = MockServer::start().await;
    mock_search(
        &server,
        "!\"Brutal Cathar\"",
        list(vec![serde_json::json!({
            "name": "Brutal Cathar // Moonrage Brute",
            "set": "mid",
            "set_name": "Innistrad: Midnight Hunt",
            "set_type": "expansion",
            "collector_number": "7",
            "rarity": "rare",
            "games": ["paper", "arena"],
            "card_faces": [
                { "name": "Brutal Cathar", "colors": ["W"], "mana_cost": "{2}{W}", "type_line": "Creature — Human Soldier Werewolf" },
                { "name": "Moonrage Brute", "colors": ["R"], "mana_cost": "", "type_line": "Creature — Werewolf" }
            ]
        })]),
    )
    .await;

    let result = run_resolver(server.uri(), test_config(), |resolver| {
        resolver.resolve(&["Brutal Cathar"], &ResolveOptions::default())
    })
    .await;

    assert_eq!(found_names(&result), vec!["Brutal Cathar // Moonrage Brute"]);
    assert!(result.unfound.is_empty());
    let card = &result.found[0];
    assert_eq!(card.colors, vec![Color::White, Color::Red]);
    assert_eq!(card.mana_cost, "{2}{W}");
    assert_eq!(card.printings[0].rarity, Rarity::Rare);
}

#[tokio::test]
async fn cards_in_set_filters_by_printing() {
    let server = MockServer::start().await;
    mock_search(
        &server,
        "!\"Opt\" OR !\"Shock\"",
        list(vec![paper("Opt", "xln", "65"), paper("Shock", "m19", "156")]),
    )
    .await;

    let result = run_resolver(server.uri(), test_config(), |resolver| {
        resolver.resolve(&["Opt", "Shock"], &ResolveOptions::default())
    })
    .await;

    let in_xln: Vec<_> = result
        .cards_in_set("XLN")
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(in_xln, vec!["Opt"]);
}

#[test]
fn dedupe_names_keeps_first_spelling() {
    let names = super::dedupe_names(&["  Opt ", "OPT", "", "Shock"]);
    assert_eq!(names, vec!["Opt".to_string(), "Shock".to_string()]);
}
