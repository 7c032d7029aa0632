//! Opportunities Hub client core.
//!
//! Aggregates opportunity posts from a WordPress content source and talks
//! to the Opportunities Hub backend for auth, profiles, check-ins, and the
//! community leaderboard. The CLI in [`cli`] is one consumer of the core;
//! the library surface is what other front ends build on.

pub mod api;
pub mod auth;
pub mod cli;
pub mod community;
pub mod config;
pub mod feed;
pub mod gate;
pub mod models;
pub mod paths;
pub mod store;
