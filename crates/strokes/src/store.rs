//! Reading and writing stroke record files.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codec::{self, DecodedRecord, RecordError};
use crate::types::StrokeRecord;

/// Errors raised while persisting stroke records
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Write `record` to `path` as pretty JSON.
///
/// The file is written next to its destination first and then renamed
/// over it, so a crash never leaves a half-written record behind.
pub fn save_record(path: impl AsRef<Path>, record: &StrokeRecord) -> Result<(), StorageError> {
    let path = path.as_ref();
    let text = codec::encode(record)?;

    let staging = path.with_extension("json.partial");
    if let Err(e) = std::fs::write(&staging, text) {
        discard_staging(&staging);
        return Err(StorageError::io(&staging, e));
    }
    if let Err(e) = std::fs::rename(&staging, path) {
        discard_staging(&staging);
        return Err(StorageError::io(path, e));
    }

    info!("Saved {} strokes to {}", record.len(), path.display());
    Ok(())
}

fn discard_staging(staging: &Path) {
    match std::fs::remove_file(staging) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", staging.display(), e),
    }
}

fn read_text(path: &Path) -> Result<String, StorageError> {
    std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))
}

/// Load a record, failing on the first invalid stroke.
pub fn load_record(path: impl AsRef<Path>) -> Result<StrokeRecord, StorageError> {
    let path = path.as_ref();
    let record = codec::decode(&read_text(path)?)?;
    debug!("Loaded {} strokes from {}", record.len(), path.display());
    Ok(record)
}

/// Load a record, skipping strokes whose shape does not match their tool.
pub fn load_record_lenient(path: impl AsRef<Path>) -> Result<DecodedRecord, StorageError> {
    let path = path.as_ref();
    let decoded = codec::decode_lenient(&read_text(path)?)?;
    debug!(
        "Loaded {} strokes from {} ({} rejected)",
        decoded.record.len(),
        path.display(),
        decoded.rejected.len()
    );
    Ok(decoded)
}
