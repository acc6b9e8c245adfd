//! Test support: an in-memory redb backend whose writes can be switched
//! off, for exercising the save-failure path.
//!
//! Enabled for this crate's own tests and, for downstream crates, through
//! the `testing` feature.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use redb::StorageBackend;
use redb::backends::InMemoryBackend;

use crate::artifacts::ArtifactStore;
use crate::error::ArtifactResult;
use crate::store::ModelStore;

/// Turns write failures on or off for a [`FailingBackend`].
#[derive(Debug, Clone, Default)]
pub struct WriteSwitch(Arc<AtomicBool>);

impl WriteSwitch {
    /// Make every subsequent write and sync fail.
    pub fn fail_writes(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn failing(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// `InMemoryBackend` that returns an I/O error on write once its switch
/// is flipped. Reads keep working.
#[derive(Debug)]
pub struct FailingBackend {
    inner: InMemoryBackend,
    switch: WriteSwitch,
}

impl FailingBackend {
    pub fn new(switch: WriteSwitch) -> Self {
        Self {
            inner: InMemoryBackend::new(),
            switch,
        }
    }

    fn check(&self) -> Result<(), io::Error> {
        if self.switch.failing() {
            Err(io::Error::other("injected write failure"))
        } else {
            Ok(())
        }
    }
}

impl StorageBackend for FailingBackend {
    fn len(&self) -> Result<u64, io::Error> {
        self.inner.len()
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> Result<(), io::Error> {
        self.inner.read(offset, out)
    }

    fn set_len(&self, len: u64) -> Result<(), io::Error> {
        self.check()?;
        self.inner.set_len(len)
    }

    fn sync_data(&self) -> Result<(), io::Error> {
        self.check()?;
        self.inner.sync_data()
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<(), io::Error> {
        self.check()?;
        self.inner.write(offset, data)
    }
}

/// Artifact store over a [`FailingBackend`], plus the switch for it.
pub fn failing_artifacts() -> ArtifactResult<(ArtifactStore, WriteSwitch)> {
    let switch = WriteSwitch::default();
    let store = ArtifactStore::open_with_backend(FailingBackend::new(switch.clone()))?;
    Ok((store, switch))
}

/// Model store whose artifact writes start failing once the switch is
/// flipped.
pub fn failing_model_store() -> ArtifactResult<(ModelStore, WriteSwitch)> {
    let (artifacts, switch) = failing_artifacts()?;
    Ok((ModelStore::with_artifacts(artifacts), switch))
}
