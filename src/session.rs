//! Persisted auth session: the bearer token and the user object,
//! written as one JSON file under the data directory. Initialized from
//! disk at startup, mutated only via login/logout; logout removes the
//! file. A corrupted file is cleared and treated as no session, never
//! as a fatal error.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::gateway::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

/// Load the persisted session, if any. Corrupted JSON clears the file.
pub fn load(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("Corrupted session file {}, clearing: {}", path.display(), e);
            clear(path);
            None
        }
    }
}

pub fn save(path: &Path, session: &Session) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(session)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, content)
}

/// Remove the persisted session. Missing file is fine.
pub fn clear(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove session file {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("planit-session-{}-{}", std::process::id(), name))
    }

    fn user() -> User {
        User {
            id: Some("65f2a0c4e13b".to_string()),
            username: "ada".to_string(),
            email: Some("ada@example.com".to_string()),
        }
    }

    #[test]
    fn roundtrip() {
        let path = temp_path("roundtrip");
        let session = Session::new("tok-123", user());
        save(&path, &session).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.token, "tok-123");
        assert_eq!(loaded.user.username, "ada");

        clear(&path);
        assert!(load(&path).is_none());
    }

    #[test]
    fn corrupted_file_is_cleared_not_fatal() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{not json").unwrap();

        assert!(load(&path).is_none());
        assert!(!path.exists()); // cleared
    }

    #[test]
    fn missing_file_is_no_session() {
        let path = temp_path("missing");
        clear(&path); // double-clear is harmless
        assert!(load(&path).is_none());
    }
}
