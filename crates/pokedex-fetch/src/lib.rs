// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod cache;
mod page;
mod prefetch;

pub use cache::{CacheKey, FetchCache, Gateway};
pub use page::{
    DETAIL_CONCURRENCY, INITIAL_PAGE_SIZE, LOAD_MORE_THRESHOLD, LoadOutcome, PAGE_SIZE, PageSession,
    PageState, near_end,
};
pub use prefetch::{
    PREFETCH_CONCURRENCY, PREFETCH_DELAY, PREFETCH_DETAIL_LIMIT, RELATED_INSIGHT_LIMIT,
    related_targets, spawn_warm_next_page, warm_next_page, warm_related_insights,
};
