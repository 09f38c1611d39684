// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use pokedex_fetch::{
    FetchCache, LoadOutcome, PAGE_SIZE, PREFETCH_DETAIL_LIMIT, PageSession, warm_next_page,
};
use pokedex_testkit::{FakeGateway, sample_roster};

fn session(record_count: u32) -> PageSession<FakeGateway> {
    PageSession::new(FetchCache::new(FakeGateway::new(sample_roster(
        record_count,
    ))))
}

#[test]
fn initial_load_fills_one_page_with_details() {
    let mut session = session(65);
    session.load_initial().expect("initial load should succeed");

    let state = session.state();
    assert_eq!(state.roster.len(), 30);
    assert_eq!(state.detailed.len(), 30);
    assert_eq!(state.current_page, 0);
    assert!(state.has_more);
    assert!(!state.loading_initial);
    // Details line up with the roster.
    assert_eq!(state.detailed[0].name, state.roster[0].name);
    assert_eq!(state.detailed[29].name, state.roster[29].name);
}

#[test]
fn walking_a_65_record_remote_takes_three_pages() {
    let mut session = session(65);
    session.load_initial().expect("initial load should succeed");
    assert_eq!(session.state().roster.len(), 30);
    assert!(session.state().has_more);

    let outcome = session.load_more().expect("second page should succeed");
    assert_eq!(outcome, LoadOutcome::Appended(30));
    assert_eq!(session.state().roster.len(), 60);
    assert_eq!(session.state().current_page, 1);
    assert!(session.state().has_more);

    let outcome = session.load_more().expect("third page should succeed");
    assert_eq!(outcome, LoadOutcome::Appended(5));
    assert_eq!(session.state().roster.len(), 65);
    assert_eq!(session.state().detailed.len(), 65);
    // Short page exhausts the remote.
    assert!(!session.state().has_more);

    let outcome = session.load_more().expect("guard should skip");
    assert_eq!(outcome, LoadOutcome::Skipped);
    assert_eq!(session.state().roster.len(), 65);
}

#[test]
fn an_exact_multiple_ends_with_an_empty_page() {
    let mut session = session(60);
    session.load_initial().expect("initial load should succeed");
    session.load_more().expect("second page should succeed");
    assert_eq!(session.state().roster.len(), 60);
    assert!(session.state().has_more);

    let outcome = session.load_more().expect("empty page should succeed");
    assert_eq!(outcome, LoadOutcome::Exhausted);
    assert!(!session.state().has_more);
    // The empty page does not advance the counter.
    assert_eq!(session.state().current_page, 1);
}

#[test]
fn page_failure_keeps_accumulated_records_and_allows_retry() {
    let mut session = session(65);
    session.load_initial().expect("initial load should succeed");

    session.cache().gateway().fail_detail("specimen-40");
    let error = session.load_more().expect_err("page should fail");
    assert!(error.to_string().contains("specimen-40"));
    assert_eq!(session.state().roster.len(), 30);
    assert!(!session.state().loading_more);

    session.cache().gateway().clear_failures();
    let outcome = session.load_more().expect("retry should succeed");
    assert_eq!(outcome, LoadOutcome::Appended(30));
    assert_eq!(session.state().roster.len(), 60);
}

#[test]
fn initial_failure_resets_the_loading_flag() {
    let gateway = FakeGateway::new(sample_roster(5));
    gateway.fail_detail("charmander");
    let mut session = PageSession::new(FetchCache::new(gateway));

    assert!(session.load_initial().is_err());
    assert!(!session.state().loading_initial);
    assert!(session.state().roster.is_empty());

    session.cache().gateway().clear_failures();
    session.load_initial().expect("retry should succeed");
    assert_eq!(session.state().roster.len(), 5);
}

#[test]
fn reload_replaces_accumulated_state() {
    let mut session = session(65);
    session.load_initial().expect("initial load should succeed");
    session.load_more().expect("second page should succeed");
    assert_eq!(session.state().roster.len(), 60);

    session.load_initial().expect("reload should succeed");
    assert_eq!(session.state().roster.len(), 30);
    assert_eq!(session.state().current_page, 0);
}

#[test]
fn warming_the_next_page_caps_detail_fetches() {
    let cache = FetchCache::new(FakeGateway::new(sample_roster(65)));
    warm_next_page(&cache, PAGE_SIZE, 30);

    assert_eq!(cache.gateway().list_calls(PAGE_SIZE, 30), 1);
    assert_eq!(cache.gateway().total_detail_calls(), PREFETCH_DETAIL_LIMIT);
    // Record 31 opens the warmed window, record 43 falls past it.
    assert!(cache.detail_cached("nidoqueen"));
    assert!(!cache.detail_cached("specimen-43"));
}

#[test]
fn a_warmed_page_loads_without_new_gateway_calls() {
    let cache = FetchCache::new(FakeGateway::new(sample_roster(65)));
    let mut session = PageSession::new(cache.clone());
    session.load_initial().expect("initial load should succeed");

    warm_next_page(&cache, PAGE_SIZE, 30);
    let before = cache.gateway().total_detail_calls();

    session.load_more().expect("second page should succeed");
    let after = cache.gateway().total_detail_calls();
    // Only the records past the warm limit needed fresh fetches.
    assert_eq!(after - before, 30 - PREFETCH_DETAIL_LIMIT);
}

#[test]
fn related_insights_warm_in_the_background() {
    let cache = FetchCache::new(FakeGateway::new(sample_roster(60)));
    let mut session = PageSession::new(cache.clone());
    session.load_initial().expect("initial load should succeed");

    let detailed = session.state().detailed.clone();
    let current = detailed[0].clone();
    pokedex_fetch::warm_related_insights(&cache, &current, &detailed);

    // The warm runs on a detached thread; poll until it lands.
    let related = pokedex_fetch::related_targets(
        &current,
        &detailed,
        pokedex_fetch::RELATED_INSIGHT_LIMIT,
    );
    assert!(!related.is_empty());
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
    while std::time::Instant::now() < deadline {
        if related.iter().all(|entry| cache.insight_cached(&entry.name)) {
            return;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    panic!("related insights were never warmed");
}
