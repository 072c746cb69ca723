//! Raw transcript storage.
//!
//! Transcripts are immutable once saved and are keyed by context id. The
//! flat-file store keeps one `<context_id>.txt` per transcript.

use crate::error::{DeenbotError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Mint a fresh context id of the form `trans_<8 hex chars>`.
pub fn new_context_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("trans_{}", &hex[..8])
}

/// Context ids double as file names, so only a safe character set is allowed.
pub fn validate_context_id(context_id: &str) -> Result<()> {
    let valid = !context_id.is_empty()
        && context_id.len() <= 128
        && context_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(DeenbotError::InvalidInput(format!(
            "Invalid context id: {:?}",
            context_id
        )))
    }
}

/// Source of raw transcript text.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Fetch a transcript, `None` when the context is unknown.
    async fn get_transcript(&self, context_id: &str) -> Result<Option<String>>;

    /// Persist a transcript under a context id.
    async fn save_transcript(&self, context_id: &str, text: &str) -> Result<()>;

    /// All stored context ids, sorted.
    async fn list_ids(&self) -> Result<Vec<String>>;
}

/// Transcript store backed by a directory of text files.
#[derive(Debug, Clone)]
pub struct FileTranscriptStore {
    dir: PathBuf,
}

impl FileTranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, context_id: &str) -> Result<PathBuf> {
        validate_context_id(context_id)?;
        Ok(self.dir.join(format!("{}.txt", context_id)))
    }
}

/// Decode transcript bytes: UTF-8, then UTF-16 with a BOM, then lossy UTF-8.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let utf16 = match bytes {
        [0xFF, 0xFE, rest @ ..] => Some((rest, u16::from_le_bytes as fn([u8; 2]) -> u16)),
        [0xFE, 0xFF, rest @ ..] => Some((rest, u16::from_be_bytes as fn([u8; 2]) -> u16)),
        _ => None,
    };
    if let Some((rest, to_unit)) = utf16 {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| to_unit([pair[0], pair[1]]))
            .collect();
        if let Ok(text) = String::from_utf16(&units) {
            return text;
        }
    }

    warn!("Transcript is not valid UTF-8 or UTF-16, decoding lossily");
    String::from_utf8_lossy(bytes).into_owned()
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn get_transcript(&self, context_id: &str) -> Result<Option<String>> {
        let path = self.path_for(context_id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!("Loaded transcript {} ({} bytes)", context_id, bytes.len());
                Ok(Some(decode_text(&bytes)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DeenbotError::Transcript(format!(
                "Failed to read {:?}: {}",
                path, e
            ))),
        }
    }

    async fn save_transcript(&self, context_id: &str, text: &str) -> Result<()> {
        let path = self.path_for(context_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, text).await?;
        debug!("Saved transcript {} to {:?}", context_id, path);
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_id_format() {
        let id = new_context_id();
        assert!(id.starts_with("trans_"));
        assert_eq!(id.len(), 14);
        assert!(id[6..].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(validate_context_id(&id).is_ok());
    }

    #[test]
    fn test_rejects_path_like_ids() {
        assert!(validate_context_id("../etc/passwd").is_err());
        assert!(validate_context_id("").is_err());
        assert!(validate_context_id("a b").is_err());
    }

    #[test]
    fn test_decode_text_variants() {
        assert_eq!(decode_text("سلام".as_bytes()), "سلام");
        assert_eq!(decode_text(b"\xEF\xBB\xBFhello"), "hello");

        let mut utf16 = vec![0xFF, 0xFE];
        for unit in "صلاة".encode_utf16() {
            utf16.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_text(&utf16), "صلاة");

        assert_eq!(decode_text(b"ok\xFFok"), "ok\u{FFFD}ok");
    }

    #[tokio::test]
    async fn test_save_get_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTranscriptStore::new(dir.path().join("transcripts"));

        assert!(store.get_transcript("trans_missing").await.unwrap().is_none());
        assert!(store.list_ids().await.unwrap().is_empty());

        store.save_transcript("trans_b", "second").await.unwrap();
        store.save_transcript("trans_a", "الصلاة خمس").await.unwrap();

        assert_eq!(
            store.get_transcript("trans_a").await.unwrap().as_deref(),
            Some("الصلاة خمس")
        );
        assert_eq!(store.list_ids().await.unwrap(), vec!["trans_a", "trans_b"]);
    }
}
