use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{DialogueError, DialogueResult};

/// Guard over the exclusive audio device window
pub type DeviceGuard = OwnedMutexGuard<()>;

/// The shared audio device. Recording and playback are mutually exclusive:
/// whoever holds the guard owns the device until it is dropped.
#[derive(Clone, Default)]
pub struct AudioDevice {
    inner: Arc<Mutex<()>>,
}

impl AudioDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the device without waiting; fails with DeviceBusy if held
    pub fn try_acquire(&self) -> DialogueResult<DeviceGuard> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .map_err(|_| DialogueError::DeviceBusy)
    }
}
