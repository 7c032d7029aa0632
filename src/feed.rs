//! Feed pagination and merge logic.
//!
//! The accumulator is keyed by post id: page 1 replaces it, later pages
//! append only ids not already present. "Fresh" posts are fetched
//! separately and the "latest" view excludes anything already in the fresh
//! rail, so the two never overlap.

use std::collections::HashSet;

use crate::api::{ApiError, ContentClient, retry_fixed};
use crate::models::Post;

/// Client-side feed state.
#[derive(Debug, Default)]
pub struct FeedState {
    /// Accumulated posts across all fetched pages, de-duplicated by id.
    pub posts: Vec<Post>,
    /// Separately fetched most-recent posts shown in their own rail.
    pub fresh: Vec<Post>,
    /// Last page applied to the accumulator.
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
    /// Guard against concurrent load-more requests.
    pub is_loading_more: bool,
}

impl FeedState {
    /// Applies one fetched page.
    ///
    /// Page 1 replaces the accumulator (pull-to-refresh semantics); later
    /// pages append only posts whose id is not yet present.
    pub fn apply_page(&mut self, page: u32, data: Vec<Post>, total_pages: u32) {
        if page <= 1 {
            self.posts = data;
        } else {
            let seen: HashSet<u64> = self.posts.iter().map(|p| p.id).collect();
            self.posts.extend(data.into_iter().filter(|p| !seen.contains(&p.id)));
        }
        self.page = page;
        self.total_pages = total_pages;
        self.has_more = page < total_pages;
    }

    /// Replaces the fresh rail.
    pub fn set_fresh(&mut self, posts: Vec<Post>) {
        self.fresh = posts;
    }

    /// The accumulator minus anything already shown in the fresh rail.
    pub fn latest_posts(&self) -> Vec<&Post> {
        let fresh_ids: HashSet<u64> = self.fresh.iter().map(|p| p.id).collect();
        self.posts
            .iter()
            .filter(|p| !fresh_ids.contains(&p.id))
            .collect()
    }

    /// True when another page may be requested.
    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.is_loading_more
    }
}

/// Fetches the next page into the accumulator.
///
/// A no-op returning `Ok(false)` when there is nothing more to load or a
/// load is already in flight. Content fetches use the query-layer retry
/// policy (2 retries, fixed delay).
pub async fn load_more(
    state: &mut FeedState,
    client: &ContentClient,
    per_page: u32,
) -> Result<bool, ApiError> {
    if !state.can_load_more() {
        return Ok(false);
    }

    state.is_loading_more = true;
    let next = state.page + 1;
    let result = retry_fixed(|| client.list_posts(next, per_page)).await;
    state.is_loading_more = false;

    let fetched = result?;
    state.apply_page(next, fetched.posts, fetched.total_pages);
    Ok(true)
}

/// Loads (or reloads) the first page plus the fresh rail.
pub async fn load_initial(
    state: &mut FeedState,
    client: &ContentClient,
    per_page: u32,
    fresh_limit: u32,
) -> Result<(), ApiError> {
    let first = retry_fixed(|| client.list_posts(1, per_page)).await?;
    state.apply_page(1, first.posts, first.total_pages);

    let fresh = retry_fixed(|| client.fresh_posts(fresh_limit)).await?;
    state.set_fresh(fresh);
    Ok(())
}

/// Filters posts to those tagged with the given category id.
pub fn filter_by_category(posts: &[Post], category_id: u64) -> Vec<&Post> {
    posts
        .iter()
        .filter(|p| p.categories.contains(&category_id))
        .collect()
}

/// Case-insensitive substring search over title and raw (HTML-inclusive)
/// content.
pub fn search_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let needle = query.to_lowercase();
    posts
        .iter()
        .filter(|p| matches_query(p, &needle))
        .collect()
}

/// Applies both filters at once (category inclusion, then search).
pub fn filter_posts<'a>(
    posts: &'a [Post],
    category_id: Option<u64>,
    query: Option<&str>,
) -> Vec<&'a Post> {
    let needle = query.map(str::to_lowercase);
    posts
        .iter()
        .filter(|p| category_id.is_none_or(|id| p.categories.contains(&id)))
        .filter(|p| needle.as_deref().is_none_or(|n| matches_query(p, n)))
        .collect()
}

fn matches_query(post: &Post, needle: &str) -> bool {
    post.title.rendered.to_lowercase().contains(needle)
        || post.content.rendered.to_lowercase().contains(needle)
}
