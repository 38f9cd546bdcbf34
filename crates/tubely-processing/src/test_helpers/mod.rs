//! Test helpers for pipeline and API tests
//!
//! In-memory implementations of `Storage` and `VideoStore`, plus fake `ffprobe` and
//! `ffmpeg` executables, so tests run without S3, PostgreSQL or the real tools.

#[cfg(unix)]
pub mod fake_tools;
pub mod mock_storage;
pub mod mock_store;

#[cfg(unix)]
pub use fake_tools::FakeTools;
pub use mock_storage::{MockStorage, StoredObject};
pub use mock_store::MemoryVideoStore;

use std::sync::{Arc, Mutex};

/// Ordered record of side effects shared between the fakes ("put:<key>", "update:<id>").
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
