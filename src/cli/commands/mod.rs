//! Command handlers.

pub mod auth;
pub mod community;
pub mod config;
pub mod feed;

use anyhow::Result;

use crate::store::SessionStore;

/// Shows the one-time onboarding notice and marks it completed.
pub fn onboarding(store: &SessionStore) -> Result<()> {
    println!("Welcome to Opportunities Hub!");
    println!();
    println!("Browse curated job and opportunity posts, check in daily to");
    println!("grow your streak, and climb the community leaderboard.");
    println!();
    println!("You can browse as a guest; log in with `opphub login` to");
    println!("unlock your profile and the community features.");
    println!();

    store.complete_onboarding()?;
    Ok(())
}
