//! Batch upload types.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use url::Url;

/// Per-row verdict reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FraudStatus {
    Fraudulent,
    Legitimate,
    /// The backend failed to process this row.
    Error,
}

impl FraudStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudStatus::Fraudulent => "Fraudulent",
            FraudStatus::Legitimate => "Legitimate",
            FraudStatus::Error => "Error",
        }
    }
}

/// One backend-returned record of a batch upload. Read-only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchRow {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub hashed_value: Option<String>,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub receiver_id: String,
    pub fraud_status: FraudStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default, deserialize_with = "link_or_none")]
    pub blockchain_link: Option<Url>,
}

impl BatchRow {
    /// Display form of the hash: the first `chars` characters and an
    /// ellipsis. Empty when the row has no hash.
    pub fn hash_preview(&self, chars: usize) -> String {
        match &self.hashed_value {
            Some(hash) => format!("{}...", hash.chars().take(chars).collect::<String>()),
            None => String::new(),
        }
    }
}

/// Body of `POST /upload_csv`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub processed: Option<usize>,
    #[serde(default)]
    pub results: Vec<BatchRow>,
}

/// A file selected for upload, read into memory.
#[derive(Debug, Clone)]
pub struct BatchFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl BatchFile {
    pub fn new(file_name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            contents,
        }
    }

    /// Read a file from disk, keeping only its final path component as name.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self { file_name, contents })
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn link_or_none<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = empty_as_none(deserializer)?;
    Ok(value.and_then(|s| match Url::parse(&s) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!(link = %s, error = %e, "Dropping unparseable blockchain link");
            None
        }
    }))
}
