//! Wire and domain types shared across the client.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Authenticated user identity, as returned by the backend and persisted
/// in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
}

/// A WordPress rendered field (`{"rendered": "..."}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rendered {
    pub rendered: String,
}

/// An opportunity post from the WordPress content source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub date: NaiveDateTime,
    pub title: Rendered,
    /// Rendered body; raw HTML is kept as-is (search matches against it).
    pub content: Rendered,
    #[serde(default)]
    pub categories: Vec<u64>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Embedded>,
}

impl Post {
    /// Returns the author name from the embedded envelope, if present.
    pub fn author_name(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .author
            .first()
            .map(|a| a.name.as_str())
    }

    /// Returns the featured media URL from the embedded envelope, if present.
    pub fn featured_media_url(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .featured_media
            .first()
            .map(|m| m.source_url.as_str())
    }
}

/// The `_embedded` envelope delivered with `?_embed=true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Embedded {
    #[serde(default)]
    pub author: Vec<EmbeddedAuthor>,
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<EmbeddedMedia>,
    #[serde(rename = "wp:term", default)]
    pub terms: Vec<Vec<EmbeddedTerm>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedAuthor {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedMedia {
    pub source_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedTerm {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub taxonomy: String,
}

/// A post category from the content source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Community experience levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Newcomer,
    Explorer,
    Contributor,
    Collaborator,
    Achiever,
    Expert,
    Legend,
}

/// A member entry on the community leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub level: Level,
    #[serde(default)]
    pub profile: CommunityProfile,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityProfile {
    #[serde(default)]
    pub skills: Vec<String>,
}

/// One page of the community leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub users: Vec<CommunityUser>,
    pub pagination: Pagination,
}

/// Cursor-style pagination envelope from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_users: u64,
    pub has_more: bool,
}

/// Full profile document from `GET /profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default)]
    pub profile: ProfileDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDetails {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Body for `PUT /profile/basic`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BasicProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

/// Result of a daily check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub message: String,
    pub xp: u64,
    pub level: Level,
    pub stars: u32,
    pub streak: Streak,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

/// Response shape shared by login and register.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Response shape of the refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
