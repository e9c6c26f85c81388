use std::{
    fs, io,
    path::{Path, PathBuf},
};

use star_chart_system_progression::{SnapshotStore, StoreError};

/// Completion snapshot kept in a single JSON file.
#[derive(Clone, Debug)]
pub(crate) struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by the file at `path`.
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        // Stage next to the target so the rename stays on one filesystem.
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, contents)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileStore::new(dir.path().join("state.json"));

        assert!(store.read().expect("missing file is not an error").is_none());
    }

    #[test]
    fn write_replaces_previous_contents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = FileStore::new(dir.path().join("state.json"));

        store.write(r#"{"p":["a"]}"#).expect("first write");
        store.write(r#"{"p":[]}"#).expect("second write");

        assert_eq!(
            store.read().expect("readable").as_deref(),
            Some(r#"{"p":[]}"#)
        );
        assert!(!dir.path().join("state.tmp").exists());
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = FileStore::new(dir.path().join("absent").join("state.json"));

        assert!(matches!(store.write("{}"), Err(StoreError::Io(_))));
    }
}
