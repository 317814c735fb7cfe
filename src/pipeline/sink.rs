use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use super::error::SinkError;
use crate::resample::Sample;

/// Persists the complete, ordered sample buffer once production has finished.
///
/// A sink must call [`FlushGate::commit`] immediately before making its output
/// visible and must publish nothing if the gate refuses.
pub trait Sink: Send + 'static {
    fn flush(&mut self, samples: &[Sample], gate: &FlushGate) -> Result<(), SinkError>;
}

const GATE_OPEN: u8 = 0;
const GATE_COMMITTED: u8 = 1;
const GATE_CLOSED: u8 = 2;

/// Shared between a flush running on the blocking pool and the task waiting
/// on it. Exactly one of `commit` and `close` wins.
#[derive(Debug, Clone, Default)]
pub struct FlushGate {
    state: Arc<AtomicU8>,
}

impl FlushGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the right to publish. Returns false once the gate is closed.
    pub fn commit(&self) -> bool {
        self.state
            .compare_exchange(GATE_OPEN, GATE_COMMITTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Refuses any later commit. Returns false if the sink already committed.
    pub fn close(&self) -> bool {
        self.state
            .compare_exchange(GATE_OPEN, GATE_CLOSED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Writes a CSV table. Rows go to `<path>.tmp` first and are renamed onto
/// `path` only after the whole table is written.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn write_table(path: &Path, samples: &[Sample]) -> Result<(), SinkError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(Sample::COLUMNS)?;
        for sample in samples {
            writer.serialize(sample)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Sink for CsvSink {
    fn flush(&mut self, samples: &[Sample], gate: &FlushGate) -> Result<(), SinkError> {
        let tmp = self.temp_path();
        let written = Self::write_table(&tmp, samples).and_then(|()| {
            if !gate.commit() {
                return Err(SinkError::Abandoned);
            }
            fs::rename(&tmp, &self.path).map_err(SinkError::from)
        });

        if let Err(e) = written {
            if tmp.exists() {
                if let Err(rm) = fs::remove_file(&tmp) {
                    log::warn!("Failed to remove {}: {}", tmp.display(), rm);
                }
            }
            return Err(e);
        }

        log::info!("Wrote {} rows to {}", samples.len(), self.path.display());
        Ok(())
    }
}

/// Keeps flushed samples in memory behind a shared handle.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    rows: Arc<Mutex<Vec<Sample>>>,
    flushes: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<Sample> {
        self.rows.lock().unwrap().clone()
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock().unwrap()
    }
}

impl Sink for MemorySink {
    fn flush(&mut self, samples: &[Sample], gate: &FlushGate) -> Result<(), SinkError> {
        if !gate.commit() {
            return Err(SinkError::Abandoned);
        }
        self.rows.lock().unwrap().extend_from_slice(samples);
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}
