// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::cache::{FetchCache, Gateway};
use crate::prefetch::spawn_warm_next_page;
use anyhow::Result;
use pokedex_app::{Pokemon, PokemonRef};

pub const INITIAL_PAGE_SIZE: u32 = 30;
pub const PAGE_SIZE: u32 = 30;
pub const DETAIL_CONCURRENCY: usize = 10;

/// How close to the end of the visible list the selection must be to
/// trigger a load-more.
pub const LOAD_MORE_THRESHOLD: usize = 10;

/// Accumulated roster plus paging flags. Transitions are pure so the
/// load-more guard can be tested without a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub roster: Vec<PokemonRef>,
    pub detailed: Vec<Pokemon>,
    pub current_page: usize,
    pub has_more: bool,
    pub loading_initial: bool,
    pub loading_more: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            detailed: Vec::new(),
            current_page: 0,
            has_more: true,
            loading_initial: false,
            loading_more: false,
        }
    }
}

impl PageState {
    pub fn begin_initial(&mut self) {
        self.loading_initial = true;
    }

    /// Replace all accumulated data with page zero.
    pub fn finish_initial(
        &mut self,
        roster: Vec<PokemonRef>,
        detailed: Vec<Pokemon>,
        requested: u32,
    ) {
        self.has_more = roster.len() as u32 == requested;
        self.roster = roster;
        self.detailed = detailed;
        self.current_page = 0;
        self.loading_initial = false;
    }

    pub fn fail_initial(&mut self) {
        self.loading_initial = false;
    }

    /// Guard for the next page. Returns false while a load is already in
    /// flight or the remote list is exhausted, so a burst of load-more
    /// triggers advances the page counter at most once.
    pub fn begin_more(&mut self) -> bool {
        if self.loading_initial || self.loading_more || !self.has_more {
            return false;
        }
        self.loading_more = true;
        true
    }

    pub fn finish_more(
        &mut self,
        roster: Vec<PokemonRef>,
        detailed: Vec<Pokemon>,
        requested: u32,
    ) {
        self.has_more = roster.len() as u32 == requested;
        self.roster.extend(roster);
        self.detailed.extend(detailed);
        self.current_page += 1;
        self.loading_more = false;
    }

    /// An empty page: flip `has_more` without advancing the counter.
    pub fn exhaust(&mut self) {
        self.has_more = false;
        self.loading_more = false;
    }

    pub fn fail_more(&mut self) {
        self.loading_more = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The guard rejected the call; nothing happened.
    Skipped,
    /// A page of this many records was appended.
    Appended(usize),
    /// The remote returned an empty page; the list is complete.
    Exhausted,
}

/// True when `visible_index` sits within the load-more window at the
/// bottom of a `visible_len`-row view.
pub fn near_end(visible_index: usize, visible_len: usize) -> bool {
    visible_len > 0 && visible_index + LOAD_MORE_THRESHOLD >= visible_len
}

/// Drives `PageState` against the cache: one roster page, then details
/// for the whole page before the state advances.
pub struct PageSession<G> {
    cache: FetchCache<G>,
    state: PageState,
    prefetch: bool,
    detail_concurrency: usize,
}

impl<G: Gateway + 'static> PageSession<G> {
    pub fn new(cache: FetchCache<G>) -> Self {
        Self {
            cache,
            state: PageState::default(),
            prefetch: false,
            detail_concurrency: DETAIL_CONCURRENCY,
        }
    }

    pub fn set_prefetch(&mut self, enabled: bool) {
        self.prefetch = enabled;
    }

    pub fn set_detail_concurrency(&mut self, concurrency: usize) {
        self.detail_concurrency = concurrency.max(1);
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn cache(&self) -> &FetchCache<G> {
        &self.cache
    }

    pub fn load_initial(&mut self) -> Result<()> {
        self.state.begin_initial();
        match self.fetch_page(INITIAL_PAGE_SIZE, 0) {
            Ok((roster, detailed)) => {
                self.state.finish_initial(roster, detailed, INITIAL_PAGE_SIZE);
                self.maybe_warm_next_page();
                Ok(())
            }
            Err(error) => {
                self.state.fail_initial();
                Err(error)
            }
        }
    }

    pub fn load_more(&mut self) -> Result<LoadOutcome> {
        if !self.state.begin_more() {
            return Ok(LoadOutcome::Skipped);
        }

        let offset = self.state.roster.len() as u32;
        match self.fetch_page(PAGE_SIZE, offset) {
            Ok((roster, _)) if roster.is_empty() => {
                self.state.exhaust();
                Ok(LoadOutcome::Exhausted)
            }
            Ok((roster, detailed)) => {
                let appended = roster.len();
                self.state.finish_more(roster, detailed, PAGE_SIZE);
                self.maybe_warm_next_page();
                Ok(LoadOutcome::Appended(appended))
            }
            Err(error) => {
                self.state.fail_more();
                Err(error)
            }
        }
    }

    fn fetch_page(&self, limit: u32, offset: u32) -> Result<(Vec<PokemonRef>, Vec<Pokemon>)> {
        let roster = self.cache.list(limit, offset)?;
        let detailed = self.cache.detail_batch(&roster, self.detail_concurrency)?;
        Ok((roster, detailed))
    }

    fn maybe_warm_next_page(&self) {
        if self.prefetch && self.state.has_more {
            spawn_warm_next_page(
                self.cache.clone(),
                PAGE_SIZE,
                self.state.roster.len() as u32,
            );
        }
    }
}
