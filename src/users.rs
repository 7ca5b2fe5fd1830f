use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors raised during registration and sign-in.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("User {0:?} is not registered")]
    NotRegistered(String),

    #[error("User {0:?} is already registered")]
    AlreadyRegistered(String),

    #[error("Wrong password for user {0:?}")]
    WrongPassword(String),

    #[error("Registry file {path} is unreadable: {detail}")]
    Corrupt { path: PathBuf, detail: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One registered user. The password is stored in plaintext, matching the
/// registry files this tool has always written; treat the registry
/// directory accordingly.
#[derive(Debug, Serialize, Deserialize)]
struct UserRecord {
    username: String,
    password: String,
}

/// Per-user bookkeeping rooted in the data directory:
/// `registry/<name>/registry.json` holds the sign-in record,
/// `storage/<name>.<ext>` the collection, `site/<name>.html` the generated
/// page.
pub struct UserRegistry {
    data_dir: PathBuf,
}

impl UserRegistry {
    pub fn new(data_dir: PathBuf) -> Self {
        UserRegistry { data_dir }
    }

    /// Usernames are keyed trimmed and lowercased, so sign-in is
    /// case-insensitive.
    fn normalize_username(raw: &str) -> Result<String, UserError> {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return Err(UserError::EmptyUsername);
        }
        Ok(name)
    }

    fn record_path(&self, username: &str) -> PathBuf {
        self.data_dir
            .join("registry")
            .join(username)
            .join("registry.json")
    }

    /// Path stem for the user's collection file; the storage backend
    /// appends its own extension.
    pub fn collection_stem(&self, username: &str) -> PathBuf {
        self.data_dir.join("storage").join(username)
    }

    /// Where the user's generated web page is written.
    pub fn page_path(&self, username: &str) -> PathBuf {
        self.data_dir.join("site").join(format!("{username}.html"))
    }

    pub fn is_registered(&self, raw_username: &str) -> Result<bool, UserError> {
        let username = Self::normalize_username(raw_username)?;
        Ok(self.record_path(&username).exists())
    }

    /// Create a sign-in record for a new user. Returns the normalized
    /// username the account was stored under.
    pub fn register(&self, raw_username: &str, password: &str) -> Result<String, UserError> {
        let username = Self::normalize_username(raw_username)?;
        let path = self.record_path(&username);
        if path.exists() {
            return Err(UserError::AlreadyRegistered(username));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| UserError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let record = UserRecord {
            username: username.clone(),
            password: password.to_string(),
        };
        let contents = serde_json::to_string_pretty(&record).map_err(|e| UserError::Corrupt {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        fs::write(&path, contents).map_err(|e| UserError::Io {
            path: path.clone(),
            source: e,
        })?;

        log::info!("Registered user {:?}", username);
        Ok(username)
    }

    /// Check a sign-in attempt. Returns the normalized username on
    /// success.
    pub fn verify(&self, raw_username: &str, password: &str) -> Result<String, UserError> {
        let username = Self::normalize_username(raw_username)?;
        let path = self.record_path(&username);
        if !path.exists() {
            return Err(UserError::NotRegistered(username));
        }

        let contents = fs::read_to_string(&path).map_err(|e| UserError::Io {
            path: path.clone(),
            source: e,
        })?;
        let record: UserRecord =
            serde_json::from_str(&contents).map_err(|e| UserError::Corrupt {
                path: path.clone(),
                detail: e.to_string(),
            })?;

        if record.password != password {
            return Err(UserError::WrongPassword(username));
        }

        log::info!("User {:?} signed in", username);
        Ok(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(dir: &tempfile::TempDir) -> UserRegistry {
        UserRegistry::new(dir.path().to_path_buf())
    }

    #[test]
    fn test_register_then_verify() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        let name = registry.register("Alice", "hunter2").unwrap();
        assert_eq!(name, "alice");
        assert!(registry.is_registered("alice").unwrap());

        // sign-in is case/whitespace-insensitive on the username
        assert_eq!(registry.verify("  ALICE ", "hunter2").unwrap(), "alice");
    }

    #[test]
    fn test_wrong_password() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        registry.register("alice", "hunter2").unwrap();

        assert!(matches!(
            registry.verify("alice", "letmein"),
            Err(UserError::WrongPassword(name)) if name == "alice"
        ));
    }

    #[test]
    fn test_unregistered_user() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        assert!(matches!(
            registry.verify("ghost", "x"),
            Err(UserError::NotRegistered(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_double_registration_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        registry.register("alice", "hunter2").unwrap();

        assert!(matches!(
            registry.register("Alice", "other"),
            Err(UserError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn test_empty_username_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        assert!(matches!(
            registry.register("   ", "pw"),
            Err(UserError::EmptyUsername)
        ));
    }

    #[test]
    fn test_per_user_paths() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        assert_eq!(
            registry.collection_stem("alice"),
            dir.path().join("storage").join("alice")
        );
        assert_eq!(
            registry.page_path("alice"),
            dir.path().join("site").join("alice.html")
        );
    }
}
