use std::io;

use thiserror::Error;

/// Key-value slot holding the persisted completion snapshot.
pub trait SnapshotStore {
    /// Reads the stored snapshot, if one was written before.
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the stored snapshot.
    fn write(&mut self, contents: &str) -> Result<(), StoreError>;
}

/// Failures reported by snapshot stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage failed.
    #[error("snapshot storage failed: {0}")]
    Io(#[from] io::Error),
    /// The store refused the operation.
    #[error("snapshot storage unavailable: {0}")]
    Unavailable(String),
}

/// In-memory store, mainly for tests and embedding without persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    contents: Option<String>,
    reject_writes: bool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a snapshot.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            reject_writes: false,
        }
    }

    /// Creates a store whose writes always fail.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            contents: None,
            reject_writes: true,
        }
    }

    /// Stored snapshot, if any.
    #[must_use]
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Unavailable("store is read-only".to_owned()));
        }
        self.contents = Some(contents.to_owned());
        Ok(())
    }
}
