//! # Search Command
//!
//! `rewardcart search "basmati rice"` goes through the same debouncer the
//! app uses, so the request is issued after the quiet period.

use std::sync::Arc;

use rewardcart_sync::{DebouncedSearch, SearchApi, SearchState};

use crate::error::CliResult;
use crate::state::AppState;

pub async fn run(state: &AppState, query: &str) -> CliResult<SearchState> {
    let api: Arc<dyn SearchApi> = state.api.clone();
    let mut search = DebouncedSearch::new(api, state.config.search.clone());

    search.submit(query);
    Ok(search.settled().await?)
}
