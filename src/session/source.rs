use crate::constants::{DATA_FILE_SUFFIX, METAMODEL_FILE_SUFFIX};
use crate::error::{LuyError, LuyResult};
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw documents of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDocuments {
    pub schema: Vec<u8>,
    pub records: Vec<u8>,
}

/// Where session documents come from.
///
/// Implementations must be usable from blocking worker threads.
pub trait DocumentSource: Send + Sync {
    /// Session ids that have both documents available, newest first.
    fn list_sessions(&self) -> LuyResult<Vec<String>>;

    fn fetch(&self, session: &str) -> LuyResult<SessionDocuments>;
}

/// Sessions stored as `<id>_metamodel.json` / `<id>_data.json` pairs in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    pattern: Regex,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> LuyResult<Self> {
        let expression = format!(
            r"^(?P<id>.+)({}|{})$",
            regex::escape(METAMODEL_FILE_SUFFIX),
            regex::escape(DATA_FILE_SUFFIX)
        );
        Ok(Self {
            root: root.into(),
            pattern: Regex::new(&expression)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, session: &str, suffix: &str) -> PathBuf {
        self.root.join(format!("{}{}", session, suffix))
    }
}

impl DocumentSource for DirectorySource {
    fn list_sessions(&self) -> LuyResult<Vec<String>> {
        // (has metamodel, has data)
        let mut found: BTreeMap<String, (bool, bool)> = BTreeMap::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(captures) = self.pattern.captures(file_name) else {
                continue;
            };
            let id = captures["id"].to_string();
            let slot = found.entry(id).or_default();
            if file_name.ends_with(METAMODEL_FILE_SUFFIX) {
                slot.0 = true;
            } else {
                slot.1 = true;
            }
        }

        let mut sessions: Vec<String> = found
            .into_iter()
            .filter_map(|(id, pair)| match pair {
                (true, true) => Some(id),
                _ => {
                    debug!("Ignoring incomplete session '{}'", id);
                    None
                }
            })
            .collect();
        sessions.reverse();
        Ok(sessions)
    }

    fn fetch(&self, session: &str) -> LuyResult<SessionDocuments> {
        let schema_path = self.document_path(session, METAMODEL_FILE_SUFFIX);
        let records_path = self.document_path(session, DATA_FILE_SUFFIX);
        if !schema_path.is_file() || !records_path.is_file() {
            return Err(LuyError::SessionNotFound(session.to_string()));
        }
        Ok(SessionDocuments {
            schema: fs::read(schema_path)?,
            records: fs::read(records_path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_complete_pairs_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "1700000000_metamodel.json",
            "1700000000_data.json",
            "1800000000_metamodel.json",
            "1800000000_data.json",
            "1900000000_metamodel.json",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), b"[]").unwrap();
        }
        fs::create_dir(dir.path().join("2000000000_data.json")).unwrap();

        let source = DirectorySource::new(dir.path()).unwrap();
        assert_eq!(
            source.list_sessions().unwrap(),
            vec!["1800000000".to_string(), "1700000000".to_string()]
        );
    }

    #[test]
    fn test_fetch_missing_session() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("42_metamodel.json"), b"[]").unwrap();
        let source = DirectorySource::new(dir.path()).unwrap();
        let err = source.fetch("42").unwrap_err();
        assert!(matches!(err, LuyError::SessionNotFound(id) if id == "42"));
    }
}
