//! The remote content store that uploads and the manifest are committed to.
use async_trait::async_trait;
use thiserror::Error;

mod github;

pub use github::GitHubStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to reach the content store: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("The content store answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unreadable content store response: {0}")]
    Decode(String),
}

impl StoreError {
    /// The provider's answer, as close to verbatim as we have it.
    pub fn provider_body(&self) -> String {
        match self {
            StoreError::Status { body, .. } => body.clone(),
            e => e.to_string(),
        }
    }
}

/// A file read back from the store.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StoredFile {
    /// Base64 content as the store returns it.
    pub content: String,
    /// Version token to pass back when updating.
    pub sha: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UpdateOutcome {
    Updated,
    /// The expected version no longer matches the stored one.
    Conflict,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create a new file. Fails if the path already exists.
    async fn create_file(&self, path: &str, content: &str, message: &str) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing is stored at `path`.
    async fn read_file(&self, path: &str) -> Result<Option<StoredFile>, StoreError>;

    /// Replace `path` only if its current version is `expected_sha`. With no
    /// expected version the file is created.
    async fn update_file(
        &self,
        path: &str,
        content: &str,
        expected_sha: Option<&str>,
        message: &str,
    ) -> Result<UpdateOutcome, StoreError>;
}
