use std::path::Path;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::audio::device::AudioDevice;
use crate::audio::file::AudioFile;
use crate::error::{DialogueError, DialogueResult};

/// Plays audio files through the shared device.
///
/// The device guard scopes the playback window and is released when the clip
/// ends, playback is cancelled, or the task fails.
pub struct Player {
    device: AudioDevice,
}

impl Player {
    pub fn new(device: AudioDevice) -> Self {
        Self { device }
    }

    /// Play a file to completion
    pub async fn play(&self, path: &Path) -> DialogueResult<()> {
        let mut handle = self.start(path)?;
        handle.wait().await
    }

    /// Start cancellable playback
    pub fn start(&self, path: &Path) -> DialogueResult<PlaybackHandle> {
        let guard = self.device.try_acquire()?;
        let audio = AudioFile::open(path)?;
        let duration = audio.duration();
        let display_path = audio.path.clone();

        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            // Guard held for the playback window, released on either exit
            let _guard = guard;
            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    info!("Playback finished: {}", display_path);
                }
                _ = stop_rx.changed() => {
                    info!("Playback cancelled: {}", display_path);
                }
            }
        });

        Ok(PlaybackHandle {
            stop_tx,
            task: Some(task),
        })
    }
}

/// Handle for one in-progress playback
#[derive(Debug)]
pub struct PlaybackHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    /// Wait for the clip to finish
    pub async fn wait(&mut self) -> DialogueResult<()> {
        if let Some(task) = self.task.take() {
            task.await.map_err(|e| {
                DialogueError::DeviceUnavailable(format!("playback task failed: {}", e))
            })?;
        }
        Ok(())
    }

    /// Cancel playback; the device is released before this returns
    pub async fn stop(&mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}
