// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::cache::{FetchCache, Gateway};
use pokedex_app::Pokemon;
use std::thread;
use std::time::Duration;

pub const PREFETCH_DELAY: Duration = Duration::from_millis(300);
pub const PREFETCH_CONCURRENCY: usize = 5;

/// Only the first few records of the next page get warmed; the rest
/// resolve on demand when the page actually loads.
pub const PREFETCH_DETAIL_LIMIT: usize = 12;

/// How many same-type neighbors get their insight warmed when a detail
/// view opens.
pub const RELATED_INSIGHT_LIMIT: usize = 6;

/// Detached best-effort warm of the next roster page. There is no
/// cancellation: a spawned warm runs to completion even if the user has
/// already paged past it, and every record it touches lands in the
/// shared cache either way.
pub fn spawn_warm_next_page<G: Gateway + 'static>(cache: FetchCache<G>, limit: u32, offset: u32) {
    thread::spawn(move || {
        thread::sleep(PREFETCH_DELAY);
        warm_next_page(&cache, limit, offset);
    });
}

/// Synchronous body of the warm, split out so tests can drive it
/// without the detached thread or the delay.
pub fn warm_next_page<G: Gateway>(cache: &FetchCache<G>, limit: u32, offset: u32) {
    let roster = match cache.list(limit, offset) {
        Ok(roster) => roster,
        Err(error) => {
            log::warn!("prefetch of page at offset {offset} failed: {error:#}");
            return;
        }
    };

    let uncached: Vec<String> = roster
        .iter()
        .map(|entry| entry.name.clone())
        .filter(|name| !cache.detail_cached(name))
        .take(PREFETCH_DETAIL_LIMIT)
        .collect();

    for chunk in uncached.chunks(PREFETCH_CONCURRENCY) {
        thread::scope(|scope| {
            for name in chunk {
                scope.spawn(move || {
                    if let Err(error) = cache.detail(name) {
                        log::warn!("prefetch of {name:?} failed: {error:#}");
                    }
                });
            }
        });
    }
}

/// Records sharing `current`'s main type, in roster order, excluding
/// `current` itself.
pub fn related_targets<'a>(
    current: &Pokemon,
    roster: &'a [Pokemon],
    limit: usize,
) -> Vec<&'a Pokemon> {
    let Some(main) = current.main_type() else {
        return Vec::new();
    };
    roster
        .iter()
        .filter(|entry| entry.id != current.id && entry.main_type() == Some(main))
        .take(limit)
        .collect()
}

/// Warm insights for the related group shown alongside an open detail
/// view. Insight fetches cannot fail, so there is nothing to report.
pub fn warm_related_insights<G: Gateway + 'static>(
    cache: &FetchCache<G>,
    current: &Pokemon,
    roster: &[Pokemon],
) {
    let names: Vec<String> = related_targets(current, roster, RELATED_INSIGHT_LIMIT)
        .into_iter()
        .map(|entry| entry.name.clone())
        .filter(|name| !cache.insight_cached(name))
        .collect();
    if names.is_empty() {
        return;
    }

    let cache = cache.clone();
    thread::spawn(move || {
        for chunk in names.chunks(PREFETCH_CONCURRENCY) {
            thread::scope(|scope| {
                for name in chunk {
                    let cache = &cache;
                    scope.spawn(move || {
                        cache.insight(name);
                    });
                }
            });
        }
    });
}
