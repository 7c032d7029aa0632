//! Community leaderboard accumulation.
//!
//! Pages arrive cursor-style (`currentPage`/`hasMore`) and accumulate in
//! arrival order. Unlike the post feed there is no de-duplication by id:
//! the server is trusted not to overlap pages.

use crate::api::{ApiError, BackendClient};
use crate::models::{CommunityUser, LeaderboardPage};

/// Client-side leaderboard state.
#[derive(Debug, Default)]
pub struct LeaderboardState {
    pub users: Vec<CommunityUser>,
    pub current_page: u32,
    pub has_more: bool,
    pub is_loading: bool,
    started: bool,
}

impl LeaderboardState {
    /// Appends one fetched page in arrival order.
    pub fn apply_page(&mut self, page: LeaderboardPage) {
        self.users.extend(page.users);
        self.current_page = page.pagination.current_page;
        self.has_more = page.pagination.has_more;
        self.started = true;
    }

    /// True when another page may be requested.
    pub fn can_load_more(&self) -> bool {
        (!self.started || self.has_more) && !self.is_loading
    }
}

/// Fetches the next leaderboard page into the accumulator.
///
/// A no-op returning `Ok(false)` when exhausted or already loading.
pub async fn load_more(
    state: &mut LeaderboardState,
    backend: &BackendClient,
    limit: u32,
) -> Result<bool, ApiError> {
    if !state.can_load_more() {
        return Ok(false);
    }

    state.is_loading = true;
    let next = state.current_page + 1;
    let result = backend.leaderboard(next, limit).await;
    state.is_loading = false;

    state.apply_page(result?);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommunityProfile, Level, Pagination};

    fn page(users: &[(&str, Level)], current: u32, has_more: bool) -> LeaderboardPage {
        LeaderboardPage {
            users: users
                .iter()
                .map(|(id, level)| CommunityUser {
                    id: (*id).to_string(),
                    name: format!("user-{id}"),
                    level: *level,
                    profile: CommunityProfile::default(),
                })
                .collect(),
            pagination: Pagination {
                current_page: current,
                total_pages: 3,
                total_users: 30,
                has_more,
            },
        }
    }

    /// Test: pages accumulate in arrival order without re-sorting.
    #[test]
    fn test_pages_accumulate_in_order() {
        let mut state = LeaderboardState::default();
        state.apply_page(page(&[("a", Level::Legend), ("b", Level::Expert)], 1, true));
        state.apply_page(page(&[("c", Level::Achiever)], 2, false));

        let ids: Vec<&str> = state.users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(!state.has_more);
    }

    /// Test: the guard allows the first load, then follows hasMore.
    #[test]
    fn test_load_guard() {
        let mut state = LeaderboardState::default();
        assert!(state.can_load_more());

        state.apply_page(page(&[("a", Level::Newcomer)], 1, true));
        assert!(state.can_load_more());

        state.is_loading = true;
        assert!(!state.can_load_more());

        state.is_loading = false;
        state.apply_page(page(&[("b", Level::Newcomer)], 2, false));
        assert!(!state.can_load_more());
    }
}
