use std::fs;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::SessionStoreError;
use crate::paths::{is_valid_session_name, session_file_name, session_root};
use crate::schema::{SessionEntry, SessionRecord, FORMAT_VERSION};

/// Named-session persistence rooted at one directory.
///
/// Records are single pretty-printed JSON documents, one file per name;
/// saving an existing name overwrites it.
pub struct SessionStore {
    sessions_dir: PathBuf,
}

impl SessionStore {
    /// Creates a store under `root` (the workspace or home directory);
    /// nothing is written until the first save.
    #[must_use]
    pub fn open(root: &Path) -> Self {
        Self {
            sessions_dir: session_root(root),
        }
    }

    /// Creates a store over an explicit sessions directory.
    #[must_use]
    pub fn at_dir(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
        }
    }

    #[must_use]
    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    pub fn save(&self, name: &str, record: &SessionRecord) -> Result<PathBuf, SessionStoreError> {
        let path = self.session_path(name)?;

        fs::create_dir_all(&self.sessions_dir)
            .map_err(|source| SessionStoreError::io("creating sessions directory", &self.sessions_dir, source))?;

        let encoded = serde_json::to_string_pretty(record).map_err(|source| {
            SessionStoreError::JsonSerialize {
                path: path.clone(),
                source,
            }
        })?;

        fs::write(&path, encoded)
            .map_err(|source| SessionStoreError::io("writing session file", &path, source))?;

        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<SessionRecord, SessionStoreError> {
        let path = self.session_path(name)?;
        if !path.is_file() {
            return Err(SessionStoreError::SessionNotFound {
                name: name.to_string(),
                path,
            });
        }

        let raw = fs::read_to_string(&path)
            .map_err(|source| SessionStoreError::io("reading session file", &path, source))?;
        let record: SessionRecord =
            serde_json::from_str(&raw).map_err(|source| SessionStoreError::JsonParse {
                path: path.clone(),
                source,
            })?;

        if record.format_version != FORMAT_VERSION {
            return Err(SessionStoreError::UnsupportedVersion {
                path,
                found: record.format_version,
                expected: FORMAT_VERSION,
            });
        }

        Ok(record)
    }

    /// Lists saved session names, sorted for stable display.
    pub fn list(&self) -> Result<Vec<String>, SessionStoreError> {
        if !self.sessions_dir.is_dir() {
            return Ok(Vec::new());
        }

        let reader = fs::read_dir(&self.sessions_dir).map_err(|source| {
            SessionStoreError::io("listing sessions directory", &self.sessions_dir, source)
        })?;

        let mut names = Vec::new();
        for item in reader {
            let item = item.map_err(|source| {
                SessionStoreError::io("listing sessions directory", &self.sessions_dir, source)
            })?;
            let path = item.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn session_path(&self, name: &str) -> Result<PathBuf, SessionStoreError> {
        if !is_valid_session_name(name) {
            return Err(SessionStoreError::InvalidSessionName {
                name: name.to_string(),
            });
        }

        Ok(self.sessions_dir.join(session_file_name(name)))
    }
}

/// Builds a fresh record with a generated id and a current RFC3339 stamp.
pub fn new_record(
    active_model: impl Into<String>,
    workspace_root: Option<String>,
    entries: Vec<SessionEntry>,
) -> Result<SessionRecord, SessionStoreError> {
    let saved_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(SessionStoreError::ClockFormat)?;

    Ok(SessionRecord {
        format_version: FORMAT_VERSION,
        session_id: Uuid::new_v4().to_string(),
        saved_at,
        active_model: active_model.into(),
        workspace_root,
        entries,
    })
}
