//! # Transaction Journal
//!
//! A disk log of admitted transactions so a restarted node can refill its
//! pool without waiting for resubmission.
//!
//! Layout: a magic header followed by length-prefixed wire-format
//! transactions. `rotate` rewrites the file from the pool's current
//! contents; `insert` appends and syncs one entry at a time. On `load`,
//! entries the pool rejects (typically stale nonces that executed while
//! the journal sat on disk) are skipped rather than treated as errors.

use crate::domain::errors::MempoolError;
use shared_types::SignedTransaction;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::PathBuf;

const JOURNAL_MAGIC: &[u8; 8] = b"EMPOOL\x00\x01";

pub struct TxJournal {
    path: PathBuf,
    writer: Option<File>,
}

impl TxJournal {
    /// A journal at `path`. Nothing is opened until `load` or `rotate`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    /// Replay journaled transactions through `add`, returning how many
    /// were accepted. A missing file is an empty journal, not an error.
    pub fn load<F>(&mut self, mut add: F) -> Result<usize, MempoolError>
    where
        F: FnMut(SignedTransaction) -> Result<(), MempoolError>,
    {
        if !self.path.exists() {
            return Ok(0);
        }
        let file = File::open(&self.path).map_err(io_error)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic).map_err(io_error)?;
        if &magic != JOURNAL_MAGIC {
            return Err(MempoolError::Journal("unrecognized journal header".into()));
        }

        let mut replayed = 0usize;
        let mut skipped = 0usize;
        loop {
            let mut len_bytes = [0u8; 4];
            match reader.read_exact(&mut len_bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(io_error(e)),
            }
            let mut bytes = vec![0u8; u32::from_le_bytes(len_bytes) as usize];
            reader.read_exact(&mut bytes).map_err(io_error)?;

            let tx = SignedTransaction::decode(&bytes)
                .map_err(|e| MempoolError::Journal(e.to_string()))?;
            match add(tx) {
                Ok(()) => replayed += 1,
                Err(_) => skipped += 1,
            }
        }

        tracing::info!(
            path = %self.path.display(),
            replayed,
            skipped,
            "transaction journal loaded"
        );
        Ok(replayed)
    }

    /// Start a fresh journal containing `transactions`, truncating any
    /// previous file, and leave it open for appends.
    pub fn rotate(&mut self, transactions: &[SignedTransaction]) -> Result<(), MempoolError> {
        self.writer = None;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(io_error)?;
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(io_error)?;
        file.write_all(JOURNAL_MAGIC).map_err(io_error)?;
        self.writer = Some(file);

        for tx in transactions {
            self.insert(tx)?;
        }
        tracing::debug!(
            path = %self.path.display(),
            entries = transactions.len(),
            "transaction journal rotated"
        );
        Ok(())
    }

    /// Append one transaction and sync it to disk. `rotate` must have
    /// opened the journal first.
    pub fn insert(&mut self, tx: &SignedTransaction) -> Result<(), MempoolError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| MempoolError::Journal("journal not open for writing".into()))?;

        let bytes = tx.encode();
        writer
            .write_all(&(bytes.len() as u32).to_le_bytes())
            .map_err(io_error)?;
        writer.write_all(&bytes).map_err(io_error)?;
        writer.sync_data().map_err(io_error)?;
        Ok(())
    }

    /// Close the write handle, syncing outstanding data.
    pub fn close(&mut self) -> Result<(), MempoolError> {
        if let Some(writer) = self.writer.take() {
            writer.sync_all().map_err(io_error)?;
        }
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> MempoolError {
    MempoolError::Journal(e.to_string())
}
