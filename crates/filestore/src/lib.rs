//! Plain-text persistence of transaction records, one `<sender>:<timestamp>`
//! line per record.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use swaplist_primitives::TransactionRecord;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cancelled while saving records")]
    Cancelled,
}

impl FileStoreError {
    fn create(path: &Path, source: io::Error) -> Self {
        Self::Create {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writes all `records` to `path`, replacing any previous content.
pub fn save_records(records: &[TransactionRecord], path: &Path) -> Result<(), FileStoreError> {
    let file = File::create(path).map_err(|e| FileStoreError::create(path, e))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        writer
            .write_all(record.to_line().as_bytes())
            .map_err(|e| FileStoreError::write(path, e))?;
    }
    writer.flush().map_err(|e| FileStoreError::write(path, e))?;

    debug!(count = records.len(), path = %path.display(), "saved records");
    Ok(())
}

/// Writes records to `path` as they arrive on `records`, flushing each line.
///
/// Returns the number of records written once the channel closes. On
/// cancellation the lines written so far stay in the file.
pub async fn save_records_stream(
    cancel: &CancellationToken,
    mut records: mpsc::Receiver<TransactionRecord>,
    path: &Path,
) -> Result<usize, FileStoreError> {
    let mut file = fs::File::create(path)
        .await
        .map_err(|e| FileStoreError::create(path, e))?;
    let mut written = 0;

    loop {
        let record = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FileStoreError::Cancelled),
            record = records.recv() => record,
        };
        let Some(record) = record else {
            break;
        };

        file.write_all(record.to_line().as_bytes())
            .await
            .map_err(|e| FileStoreError::write(path, e))?;
        file.flush()
            .await
            .map_err(|e| FileStoreError::write(path, e))?;
        written += 1;
    }

    debug!(count = written, path = %path.display(), "saved streamed records");
    Ok(written)
}
