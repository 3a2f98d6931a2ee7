use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::subtitle::SubtitleEntry;

const SESSION_FILE: &str = "session.json";
const CREDENTIAL_FILE: &str = "credential";

/// The editor state worth restoring: the uncensored subtitles and the export name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub subtitles: Vec<SubtitleEntry>,
    pub file_name: String,
}

/// Session and API key persistence in a local directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn credential_path(&self) -> PathBuf {
        self.dir.join(CREDENTIAL_FILE)
    }

    /// Load the saved session. Anything unreadable counts as no session and is removed.
    pub fn load_session(&self) -> Option<Session> {
        let path = self.session_path();
        if !path.exists() {
            return None;
        }

        let session = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str::<Session>(&content).map_err(|e| e.to_string()));

        match session {
            Ok(session) if !session.subtitles.is_empty() && !session.file_name.is_empty() => {
                debug!("Loaded session '{}' with {} subtitles", session.file_name, session.subtitles.len());
                Some(session)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to load session, discarding it: {}", e);
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!("Failed to remove session file: {}", e);
                }
                None
            }
        }
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        let content = serde_json::to_vec(session)?;
        self.write_atomic(&self.session_path(), &content)?;
        debug!("Saved session '{}'", session.file_name);
        Ok(())
    }

    pub fn clear_session(&self) -> Result<bool> {
        remove_if_exists(&self.session_path())
    }

    pub fn load_credential(&self) -> Option<String> {
        let content = std::fs::read_to_string(self.credential_path()).ok()?;
        let key = content.trim();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    pub fn save_credential(&self, key: &str) -> Result<()> {
        self.write_atomic(&self.credential_path(), key.trim().as_bytes())?;
        info!("API key stored in {}", self.dir.display());
        Ok(())
    }

    /// Forget the API key together with the session that was created under it
    pub fn clear_credential(&self) -> Result<bool> {
        self.clear_session()?;
        remove_if_exists(&self.credential_path())
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let temp_file = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            writer.write_all(content)?;
            writer.flush()?;
        }
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
