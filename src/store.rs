//! Session store: secure key/value persistence for tokens and flags.
//!
//! Stores session entries in `${OPPHUB_HOME}/session.json` with restricted
//! permissions (0600). Tokens are never logged or displayed in full.
//!
//! Writes go through a temp file followed by a rename, so callers never
//! observe a partially written store. A store that cannot be read is treated
//! by callers as "no session present", not as a fatal condition.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::models::User;
use crate::paths;

/// Key for the short-lived bearer credential.
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
/// Key for the long-lived credential exchanged for new access tokens.
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
/// Key for the JSON-serialized user identity.
pub const KEY_USER_INFO: &str = "userInfo";
/// Key for the persisted onboarding flag ("true" once completed).
pub const KEY_ONBOARDING_COMPLETED: &str = "onboardingCompleted";
/// Marker set when onboarding finished during the current run.
pub const KEY_JUST_COMPLETED_ONBOARDING: &str = "justCompletedOnboarding";

/// File-backed session store.
///
/// Cheap to clone; clones share the same underlying file. There is no
/// cross-process locking: the discipline is last write wins, and callers
/// must not assume atomicity across read-then-write sequences.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a store backed by the default session path.
    pub fn new() -> Self {
        Self {
            path: paths::session_path(),
        }
    }

    /// Creates a store backed by a specific file (used by tests).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Gets the value for a key, or None if absent.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    /// Sets the value for a key, persisting the whole store.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    /// Deletes a key. Deleting an absent key is not an error.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    /// Removes all session entries (tokens and user identity).
    ///
    /// Onboarding flags survive: a user who logs out has still seen
    /// onboarding.
    pub fn clear_session(&self) -> Result<()> {
        let mut map = self.read_map()?;
        map.remove(KEY_ACCESS_TOKEN);
        map.remove(KEY_REFRESH_TOKEN);
        map.remove(KEY_USER_INFO);
        self.write_map(&map)
    }

    /// Persists both tokens and the user identity in one write.
    pub fn save_session(&self, access: &str, refresh: &str, user: &User) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(KEY_ACCESS_TOKEN.to_string(), access.to_string());
        map.insert(KEY_REFRESH_TOKEN.to_string(), refresh.to_string());
        map.insert(
            KEY_USER_INFO.to_string(),
            serde_json::to_string(user).context("Failed to serialize user info")?,
        );
        self.write_map(&map)
    }

    /// Persists a refreshed token pair in one write.
    pub fn save_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(KEY_ACCESS_TOKEN.to_string(), access.to_string());
        map.insert(KEY_REFRESH_TOKEN.to_string(), refresh.to_string());
        self.write_map(&map)
    }

    /// Loads the persisted user identity, if any.
    pub fn load_user(&self) -> Result<Option<User>> {
        match self.get(KEY_USER_INFO)? {
            Some(json) => {
                let user = serde_json::from_str(&json).context("Failed to parse user info")?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Returns true once onboarding has been completed.
    ///
    /// A persisted user identity also counts: a user who has logged in
    /// before is assumed to have passed onboarding, and the flag is forced
    /// true retroactively by [`crate::auth`] on session restore.
    pub fn onboarding_completed(&self) -> bool {
        matches!(self.get(KEY_ONBOARDING_COMPLETED), Ok(Some(v)) if v == "true")
    }

    /// Marks onboarding as completed. The flag never reverts.
    pub fn complete_onboarding(&self) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(KEY_ONBOARDING_COMPLETED.to_string(), "true".to_string());
        map.insert(KEY_JUST_COMPLETED_ONBOARDING.to_string(), "true".to_string());
        self.write_map(&map)
    }

    /// Returns true exactly once after onboarding completes; the marker is
    /// consumed on read. Used for the one-time post-onboarding notice.
    pub fn take_just_completed_onboarding(&self) -> bool {
        match self.get(KEY_JUST_COMPLETED_ONBOARDING) {
            Ok(Some(v)) if v == "true" => {
                let _ = self.delete(KEY_JUST_COMPLETED_ONBOARDING);
                true
            }
            _ => false,
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session store from {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session store from {}", self.path.display()))
    }

    /// Writes the full map with restricted permissions (0600).
    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(map).context("Failed to serialize session store")?;

        let tmp = self.path.with_extension("json.tmp");

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&tmp)
                .with_context(|| format!("Failed to open {} for writing", tmp.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", tmp.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&tmp, &contents)
                .with_context(|| format!("Failed to write to {}", tmp.display()))?;
        }

        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(12).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = SessionStore::at(temp.path().join("session.json"));
        (temp, store)
    }

    /// Test: get on a missing file returns None, not an error.
    #[test]
    fn test_get_missing_file() {
        let (_temp, store) = temp_store();
        assert_eq!(store.get(KEY_ACCESS_TOKEN).unwrap(), None);
    }

    /// Test: set then get round-trips a value.
    #[test]
    fn test_set_and_get() {
        let (_temp, store) = temp_store();
        store.set(KEY_ACCESS_TOKEN, "tok-abc").unwrap();
        assert_eq!(
            store.get(KEY_ACCESS_TOKEN).unwrap(),
            Some("tok-abc".to_string())
        );
    }

    /// Test: delete removes a key; deleting again is a no-op.
    #[test]
    fn test_delete() {
        let (_temp, store) = temp_store();
        store.set(KEY_REFRESH_TOKEN, "r1").unwrap();
        store.delete(KEY_REFRESH_TOKEN).unwrap();
        assert_eq!(store.get(KEY_REFRESH_TOKEN).unwrap(), None);
        store.delete(KEY_REFRESH_TOKEN).unwrap();
    }

    /// Test: clear_session removes tokens and user but keeps onboarding flag.
    #[test]
    fn test_clear_session_keeps_onboarding() {
        let (_temp, store) = temp_store();
        store.set(KEY_ACCESS_TOKEN, "a").unwrap();
        store.set(KEY_REFRESH_TOKEN, "r").unwrap();
        store.set(KEY_USER_INFO, "{}").unwrap();
        store.complete_onboarding().unwrap();

        store.clear_session().unwrap();

        assert_eq!(store.get(KEY_ACCESS_TOKEN).unwrap(), None);
        assert_eq!(store.get(KEY_REFRESH_TOKEN).unwrap(), None);
        assert_eq!(store.get(KEY_USER_INFO).unwrap(), None);
        assert!(store.onboarding_completed());
    }

    /// Test: user identity round-trips through JSON serialization.
    #[test]
    fn test_user_roundtrip() {
        let (_temp, store) = temp_store();
        let user = User {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            name: "Ada".to_string(),
        };
        store.save_session("acc", "ref", &user).unwrap();

        let loaded = store.load_user().unwrap().unwrap();
        assert_eq!(loaded.id, "u1");
        assert_eq!(loaded.email, "a@b.com");
        assert_eq!(loaded.name, "Ada");
    }

    /// Test: session file has restricted permissions on Unix.
    #[cfg(unix)]
    #[test]
    fn test_session_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("session.json");
        let store = SessionStore::at(&path);
        store.set(KEY_ACCESS_TOKEN, "secret").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    /// Test: the just-completed marker reads true once, then is gone;
    /// the completed flag itself stays set.
    #[test]
    fn test_just_completed_marker_consumed_once() {
        let (_temp, store) = temp_store();
        assert!(!store.take_just_completed_onboarding());

        store.complete_onboarding().unwrap();
        assert!(store.take_just_completed_onboarding());
        assert!(!store.take_just_completed_onboarding());
        assert!(store.onboarding_completed());
    }

    /// Test: token masking.
    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("opp-access-token-1234567890"), "opp-access-t...");
        assert_eq!(mask_token("short"), "***");
    }

    /// Test: masking never slices inside a multi-byte character.
    #[test]
    fn test_mask_token_multibyte() {
        assert_eq!(mask_token("ключ-доступа-1234567890"), "ключ-доступа...");
    }
}
