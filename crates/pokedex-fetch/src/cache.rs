// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use pokedex_app::{Pokemon, PokemonRef};
use pokedex_gateway::Client;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

/// Seam between the cache and the remote gateway. Implementations must
/// be shareable across the batch fetcher's worker threads.
pub trait Gateway: Send + Sync {
    fn list(&self, limit: u32, offset: u32) -> Result<Vec<PokemonRef>>;
    fn details(&self, name: &str) -> Result<Pokemon>;

    /// Flavor text. Infallible: implementations degrade internally.
    fn insight(&self, name: &str) -> String;
}

impl Gateway for pokedex_gateway::Client {
    fn list(&self, limit: u32, offset: u32) -> Result<Vec<PokemonRef>> {
        Client::list(self, limit, offset)
    }

    fn details(&self, name: &str) -> Result<Pokemon> {
        Client::details(self, name)
    }

    fn insight(&self, name: &str) -> String {
        Client::insight(self, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    List { limit: u32, offset: u32 },
    Detail(String),
    Insight(String),
}

impl CacheKey {
    pub fn detail(name: &str) -> Self {
        Self::Detail(name.trim().to_lowercase())
    }

    pub fn insight(name: &str) -> Self {
        Self::Insight(name.trim().to_lowercase())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List { limit, offset } => write!(f, "list-{limit}-{offset}"),
            Self::Detail(name) => write!(f, "{name}"),
            Self::Insight(name) => write!(f, "insight-{name}"),
        }
    }
}

#[derive(Debug, Clone)]
enum CacheValue {
    List(Vec<PokemonRef>),
    Detail(Pokemon),
    Insight(String),
}

/// One in-flight gateway call. Waiters block on the condvar until the
/// leader deposits the shared outcome.
struct Flight {
    slot: Mutex<Option<Result<CacheValue, String>>>,
    done: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn settle(&self, outcome: Result<CacheValue, String>) {
        *lock(&self.slot) = Some(outcome);
        self.done.notify_all();
    }

    fn wait(&self) -> Result<CacheValue, String> {
        let mut slot = lock(&self.slot);
        loop {
            match slot.as_ref() {
                Some(outcome) => return outcome.clone(),
                None => slot = self.done.wait(slot).unwrap_or_else(PoisonError::into_inner),
            }
        }
    }
}

struct Shared {
    values: Mutex<HashMap<CacheKey, CacheValue>>,
    pending: Mutex<HashMap<CacheKey, Arc<Flight>>>,
}

/// Request cache with single-flight deduplication. Entries never expire;
/// `clear` is the only invalidation. Clones share one store, so handing
/// a clone to a background thread keeps warming the same cache.
pub struct FetchCache<G> {
    gateway: Arc<G>,
    shared: Arc<Shared>,
}

impl<G> Clone for FetchCache<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<G: Gateway> FetchCache<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway: Arc::new(gateway),
            shared: Arc::new(Shared {
                values: Mutex::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn list(&self, limit: u32, offset: u32) -> Result<Vec<PokemonRef>> {
        let key = CacheKey::List { limit, offset };
        match self.get_or_fetch(&key, || self.gateway.list(limit, offset).map(CacheValue::List))? {
            CacheValue::List(refs) => Ok(refs),
            _ => bail!("cache entry {key} holds a mismatched value"),
        }
    }

    pub fn detail(&self, name: &str) -> Result<Pokemon> {
        let key = CacheKey::detail(name);
        match self.get_or_fetch(&key, || self.gateway.details(name).map(CacheValue::Detail))? {
            CacheValue::Detail(pokemon) => Ok(pokemon),
            _ => bail!("cache entry {key} holds a mismatched value"),
        }
    }

    /// Cached flavor text. Fallback lines cache like real ones, so a
    /// degraded gateway is asked only once per record.
    pub fn insight(&self, name: &str) -> String {
        let key = CacheKey::insight(name);
        let outcome =
            self.get_or_fetch(&key, || Ok(CacheValue::Insight(self.gateway.insight(name))));
        match outcome {
            Ok(CacheValue::Insight(text)) => text,
            _ => pokedex_gateway::INSIGHT_FALLBACK.to_owned(),
        }
    }

    pub fn detail_cached(&self, name: &str) -> bool {
        lock(&self.shared.values).contains_key(&CacheKey::detail(name))
    }

    pub fn insight_cached(&self, name: &str) -> bool {
        lock(&self.shared.values).contains_key(&CacheKey::insight(name))
    }

    /// Drop every stored value. In-flight calls are left alone and will
    /// repopulate the store when they settle.
    pub fn clear(&self) {
        lock(&self.shared.values).clear();
    }

    /// Resolve details for `refs` in chunks of at most `concurrency`,
    /// joining each chunk before the next starts. Results preserve input
    /// order; any single failure rejects the whole batch.
    pub fn detail_batch(&self, refs: &[PokemonRef], concurrency: usize) -> Result<Vec<Pokemon>> {
        let concurrency = concurrency.max(1);
        let mut out = Vec::with_capacity(refs.len());
        for chunk in refs.chunks(concurrency) {
            let joined: Vec<_> = thread::scope(|scope| {
                let workers: Vec<_> = chunk
                    .iter()
                    .map(|entry| scope.spawn(|| self.detail(&entry.name)))
                    .collect();
                workers.into_iter().map(|worker| worker.join()).collect()
            });
            for outcome in joined {
                match outcome {
                    Ok(result) => out.push(result?),
                    Err(_) => bail!("detail worker panicked"),
                }
            }
        }
        Ok(out)
    }

    fn get_or_fetch<F>(&self, key: &CacheKey, fetch: F) -> Result<CacheValue>
    where
        F: FnOnce() -> Result<CacheValue>,
    {
        if let Some(value) = lock(&self.shared.values).get(key) {
            return Ok(value.clone());
        }

        let (flight, leader) = {
            let mut pending = lock(&self.shared.pending);
            match pending.get(key) {
                Some(flight) => (Arc::clone(flight), false),
                None => {
                    let flight = Arc::new(Flight::new());
                    pending.insert(key.clone(), Arc::clone(&flight));
                    (flight, true)
                }
            }
        };

        if !leader {
            return flight.wait().map_err(|message| anyhow!(message));
        }

        let outcome = fetch().map_err(|error| format!("{error:#}"));
        if let Ok(value) = &outcome {
            lock(&self.shared.values).insert(key.clone(), value.clone());
        }
        lock(&self.shared.pending).remove(key);
        flight.settle(outcome.clone());
        outcome.map_err(|message| anyhow!(message))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::CacheKey;

    #[test]
    fn keys_render_the_original_keyspace() {
        let page = CacheKey::List {
            limit: 30,
            offset: 60,
        };
        assert_eq!(page.to_string(), "list-30-60");
        assert_eq!(CacheKey::detail(" Pikachu ").to_string(), "pikachu");
        assert_eq!(CacheKey::insight("Mew").to_string(), "insight-mew");
    }

    #[test]
    fn detail_and_insight_keys_do_not_collide() {
        assert_ne!(CacheKey::detail("mew"), CacheKey::insight("mew"));
        assert_eq!(CacheKey::detail("MEW"), CacheKey::detail("mew"));
    }
}
