use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::hid::{FrameSource, HidError, HidTransport};
use crate::poll::{PollResult, poll};

type SharedSource = Mutex<Box<dyn FrameSource + Send>>;

/// Shared handle to one sensor. The lock is held for a whole poll cycle, so
/// at most one cycle is ever in flight per device.
#[derive(Clone)]
pub struct SensorHandle {
    inner: Arc<SharedSource>,
}

impl SensorHandle {
    pub fn open(path: &Path) -> Result<Self, HidError> {
        Ok(Self::new(HidTransport::open(path)?))
    }

    pub fn new<S: FrameSource + Send + 'static>(source: S) -> Self {
        let source: Box<dyn FrameSource + Send> = Box::new(source);
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }

    /// Run one poll cycle. Blocks on device reads; call from spawn_blocking.
    pub fn poll(&self) -> Result<PollResult, HidError> {
        let mut source = self
            .inner
            .lock()
            .map_err(|_| HidError::ReadFailed("sensor mutex poisoned".into()))?;
        poll(&mut **source)
    }
}
