use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::timeline::error::{TimelineError, TimelineResult};

use super::document::TimelineDocument;

const STATE_FILE: &str = "state.json";
const TIMELINES_DIR: &str = "timelines";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    default_user: Option<String>,
}

/// Locates and persists user timelines inside an application directory:
///
/// - `state.json` holds the default user.
/// - `timelines/<user>.json` holds one [TimelineDocument] per user.
///
/// Documents are only ever replaced as a whole. There is no locking, so two processes working on
/// the same user overwrite each other and the last save wins.
#[derive(Debug, Clone)]
pub struct UserStore {
    root: PathBuf,
}

impl UserStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn state_file(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    pub fn timelines_dir(&self) -> PathBuf {
        self.root.join(TIMELINES_DIR)
    }

    pub fn timeline_file(&self, user: &str) -> PathBuf {
        self.timelines_dir().join(format!("{user}.json"))
    }

    /// Picks `user` when given, otherwise the configured default.
    pub fn resolve_user(&self, user: Option<&str>) -> TimelineResult<String> {
        match user {
            Some(user) => {
                validate_user_name(user)?;
                Ok(user.to_string())
            }
            None => self.default_user(),
        }
    }

    pub fn default_user(&self) -> TimelineResult<String> {
        self.read_state()?
            .default_user
            .ok_or_else(|| TimelineError::NoDefaultUser(self.state_file()))
    }

    pub fn set_default_user(&self, user: &str) -> TimelineResult<()> {
        validate_user_name(user)?;
        let state = StateFile {
            default_user: Some(user.to_string()),
        };
        write_json_atomically(&self.root, &self.state_file(), &state)?;
        info!("Default user set to {user}");
        Ok(())
    }

    /// Creates an empty timeline for a new user. The user also becomes the default one when
    /// `make_default` is set or no default exists yet.
    pub fn init_user(&self, user: &str, make_default: bool) -> TimelineResult<PathBuf> {
        validate_user_name(user)?;
        let path = self.timeline_file(user);
        if path.exists() {
            return Err(TimelineError::UserAlreadyExists {
                user: user.to_string(),
                path,
            });
        }

        self.write_document(user, &TimelineDocument::default())?;

        let has_default = self.read_state()?.default_user.is_some();
        if make_default || !has_default {
            self.set_default_user(user)?;
        }
        Ok(path)
    }

    pub fn read_document(&self, user: &str) -> TimelineResult<TimelineDocument> {
        let path = self.timeline_file(user);
        debug!("Reading timeline {path:?}");
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TimelineError::UserNotFound {
                    user: user.to_string(),
                    path,
                })
            }
            Err(source) => return Err(TimelineError::Io { path, source }),
        };

        let document = serde_json::from_str::<TimelineDocument>(&content)
            .map_err(|source| TimelineError::Malformed { path, source })?;
        document.timeline.validate()?;
        document.activities.validate()?;
        Ok(document)
    }

    /// Replaces the user's document. The content goes to a temporary file first and is renamed
    /// over the old document, so a failed write leaves the previous version intact.
    pub fn write_document(&self, user: &str, document: &TimelineDocument) -> TimelineResult<()> {
        let path = self.timeline_file(user);
        write_json_atomically(&self.timelines_dir(), &path, document)?;
        info!("Saved timeline of {user} to {path:?}");
        Ok(())
    }

    fn read_state(&self) -> TimelineResult<StateFile> {
        let path = self.state_file();
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|source| TimelineError::Malformed { path, source }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StateFile::default()),
            Err(source) => Err(TimelineError::Io { path, source }),
        }
    }
}

fn validate_user_name(user: &str) -> TimelineResult<()> {
    let is_valid = !user.is_empty()
        && user != "."
        && user != ".."
        && !user.contains(['/', '\\']);
    if is_valid {
        Ok(())
    } else {
        Err(TimelineError::InvalidUserName(user.to_string()))
    }
}

fn write_json_atomically(dir: &Path, path: &Path, value: &impl Serialize) -> TimelineResult<()> {
    let io_error = |source: std::io::Error| TimelineError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(io_error)?;
    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    serde_json::to_writer_pretty(&mut file, value).map_err(|e| io_error(e.into()))?;
    file.write_all(b"\n").map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}
