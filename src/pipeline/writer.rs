use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{AnimatorError, AnimatorResult};

struct WriteJob {
    path: PathBuf,
    image: RgbaImage,
}

/// Background PNG writer.
///
/// Frames are queued on a bounded channel and encoded on a dedicated thread, so the pipeline
/// only blocks when the queue is full. Every file name is unique, so write order between
/// frames does not matter.
pub struct FrameWriter {
    tx: Option<mpsc::SyncSender<WriteJob>>,
    worker: Option<JoinHandle<AnimatorResult<Vec<PathBuf>>>>,
}

impl std::fmt::Debug for FrameWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameWriter")
            .field("open", &self.tx.is_some())
            .finish()
    }
}

impl FrameWriter {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::sync_channel::<WriteJob>(capacity.max(1));
        let worker = std::thread::spawn(move || -> AnimatorResult<Vec<PathBuf>> {
            let mut written = Vec::new();
            for job in rx {
                job.image
                    .save(&job.path)
                    .with_context(|| format!("write frame {}", job.path.display()))?;
                written.push(job.path);
            }
            Ok(written)
        });
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    pub fn write(&self, path: PathBuf, image: RgbaImage) -> AnimatorResult<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| AnimatorError::render("frame writer already finished"))?;
        tx.send(WriteJob { path, image })
            .map_err(|_| AnimatorError::render("frame writer thread stopped accepting frames"))
    }

    /// Flush the queue and return every path written, in queue order.
    ///
    /// The first write failure is returned instead.
    pub fn finish(mut self) -> AnimatorResult<Vec<PathBuf>> {
        self.join()
    }

    fn join(&mut self) -> AnimatorResult<Vec<PathBuf>> {
        drop(self.tx.take());
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| AnimatorError::render("frame writer thread panicked"))?,
            None => Ok(Vec::new()),
        }
    }
}

impl Drop for FrameWriter {
    fn drop(&mut self) {
        if self.worker.is_some()
            && let Err(err) = self.join()
        {
            tracing::warn!(error = %err, "frame writer failed while shutting down");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/writer.rs"]
mod tests;
