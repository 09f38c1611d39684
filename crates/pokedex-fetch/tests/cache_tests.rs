// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use pokedex_fetch::{FetchCache, Gateway};
use pokedex_testkit::{FakeGateway, sample_roster};
use std::thread;
use std::time::Duration;

#[test]
fn concurrent_detail_calls_share_one_gateway_call() {
    let gateway = FakeGateway::new(sample_roster(3)).with_detail_delay(Duration::from_millis(100));
    let cache = FetchCache::new(gateway);

    let (first, second) = thread::scope(|scope| {
        let cache_a = cache.clone();
        let cache_b = cache.clone();
        let a = scope.spawn(move || cache_a.detail("bulbasaur"));
        let b = scope.spawn(move || cache_b.detail("bulbasaur"));
        (a.join().expect("join"), b.join().expect("join"))
    });

    let first = first.expect("first call should succeed");
    let second = second.expect("second call should succeed");
    assert_eq!(first, second);
    assert_eq!(cache.gateway().detail_calls("bulbasaur"), 1);
}

#[test]
fn resolved_values_are_served_from_cache() {
    let cache = FetchCache::new(FakeGateway::new(sample_roster(3)));

    let first = cache.detail("ivysaur").expect("detail should succeed");
    let second = cache.detail("ivysaur").expect("detail should succeed");
    assert_eq!(first, second);
    assert_eq!(cache.gateway().detail_calls("ivysaur"), 1);

    cache.list(2, 0).expect("list should succeed");
    cache.list(2, 0).expect("list should succeed");
    assert_eq!(cache.gateway().list_calls(2, 0), 1);

    cache.insight("ivysaur");
    cache.insight("ivysaur");
    assert_eq!(cache.gateway().insight_calls("ivysaur"), 1);
}

#[test]
fn failures_are_not_cached_so_a_later_call_retries() {
    let gateway = FakeGateway::new(sample_roster(3));
    gateway.fail_detail("venusaur");
    let cache = FetchCache::new(gateway);

    assert!(cache.detail("venusaur").is_err());
    assert!(!cache.detail_cached("venusaur"));

    cache.gateway().clear_failures();
    assert!(cache.detail("venusaur").is_ok());
    assert!(cache.detail_cached("venusaur"));
    assert_eq!(cache.gateway().detail_calls("venusaur"), 2);
}

#[test]
fn waiters_share_the_leaders_failure_without_retrying() {
    let gateway = FakeGateway::new(sample_roster(3)).with_detail_delay(Duration::from_millis(100));
    gateway.fail_detail("bulbasaur");
    let cache = FetchCache::new(gateway);

    let (first, second) = thread::scope(|scope| {
        let cache_a = cache.clone();
        let cache_b = cache.clone();
        let a = scope.spawn(move || cache_a.detail("bulbasaur"));
        let b = scope.spawn(move || cache_b.detail("bulbasaur"));
        (a.join().expect("join"), b.join().expect("join"))
    });

    let first = first.expect_err("leader should fail");
    let second = second.expect_err("waiter should share the failure");
    assert!(first.to_string().contains("injected failure"));
    assert!(second.to_string().contains("injected failure"));
    assert_eq!(cache.gateway().detail_calls("bulbasaur"), 1);
}

#[test]
fn clear_drops_values_and_a_later_call_refetches() {
    let cache = FetchCache::new(FakeGateway::new(sample_roster(3)));

    cache.detail("bulbasaur").expect("detail should succeed");
    assert!(cache.detail_cached("bulbasaur"));

    cache.clear();
    assert!(!cache.detail_cached("bulbasaur"));

    cache.detail("bulbasaur").expect("detail should succeed");
    assert_eq!(cache.gateway().detail_calls("bulbasaur"), 2);
}

#[test]
fn detail_batch_preserves_input_order() {
    let cache = FetchCache::new(FakeGateway::new(sample_roster(12)));
    let mut refs = cache.gateway().list(12, 0).expect("list should succeed");
    refs.reverse();

    let detailed = cache.detail_batch(&refs, 5).expect("batch should succeed");
    assert_eq!(detailed.len(), 12);
    let names: Vec<&str> = detailed.iter().map(|p| p.name.as_str()).collect();
    let expected: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, expected);
}

#[test]
fn one_failing_detail_rejects_the_whole_batch() {
    let gateway = FakeGateway::new(sample_roster(6));
    gateway.fail_detail("charmander");
    let cache = FetchCache::new(gateway);
    let refs = cache.gateway().list(6, 0).expect("list should succeed");

    let error = cache
        .detail_batch(&refs, 3)
        .expect_err("batch should reject");
    assert!(error.to_string().contains("charmander"));
}

#[test]
fn insight_is_cached_per_record() {
    let cache = FetchCache::new(FakeGateway::new(sample_roster(2)));
    let text = cache.insight("Bulbasaur");
    assert!(text.contains("bulbasaur"));
    assert!(cache.insight_cached("bulbasaur"));
    // Detail cache is a separate keyspace.
    assert!(!cache.detail_cached("bulbasaur"));
}
