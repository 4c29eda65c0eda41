//! Single-writer actor around an [`IncrementalScanAccumulator`].
//!
//! One worker thread owns the accumulator. Producers hold a
//! [`PhotoSubmitter`] and push analysed photos over a crossbeam channel in
//! any order; the worker applies them one at a time.

use super::{AccumulatorResult, IncrementalScanAccumulator};
use crate::core::duplicates::FingerprintMetric;
use crate::core::model::PhotoRecord;
use crate::error::ScanError;
use crossbeam_channel::{bounded, unbounded, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

enum Command {
    Add(Box<PhotoRecord>),
    Snapshot(Sender<AccumulatorResult>),
    /// Stop even while submitters are still alive
    Shutdown,
}

/// Cloneable producer side of an [`AccumulatorHandle`]
#[derive(Clone)]
pub struct PhotoSubmitter {
    commands: Sender<Command>,
}

impl PhotoSubmitter {
    pub fn submit(&self, photo: PhotoRecord) -> Result<(), ScanError> {
        self.commands
            .send(Command::Add(Box::new(photo)))
            .map_err(|_| ScanError::WorkerStopped)
    }
}

/// Owner of the accumulator worker thread
pub struct AccumulatorHandle {
    submitter: Option<PhotoSubmitter>,
    worker: Option<JoinHandle<AccumulatorResult>>,
}

impl AccumulatorHandle {
    /// Move `accumulator` onto a dedicated thread
    pub fn spawn<M>(mut accumulator: IncrementalScanAccumulator<M>) -> Result<Self, ScanError>
    where
        M: FingerprintMetric + 'static,
    {
        let (sender, receiver) = unbounded::<Command>();

        let worker = thread::Builder::new()
            .name("photo-accumulator".to_string())
            .spawn(move || {
                for command in receiver {
                    match command {
                        Command::Add(photo) => accumulator.add(&photo),
                        Command::Snapshot(reply) => {
                            let _ = reply.send(accumulator.snapshot());
                        }
                        Command::Shutdown => {
                            debug!("accumulator handle dropped, closing early");
                            return accumulator.finish();
                        }
                    }
                }
                debug!("all submitters dropped, closing accumulator");
                accumulator.finish()
            })
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;

        Ok(Self {
            submitter: Some(PhotoSubmitter { commands: sender }),
            worker: Some(worker),
        })
    }

    /// A producer handle for another thread
    pub fn submitter(&self) -> Result<PhotoSubmitter, ScanError> {
        self.submitter.clone().ok_or(ScanError::WorkerStopped)
    }

    pub fn submit(&self, photo: PhotoRecord) -> Result<(), ScanError> {
        self.submitter()?.submit(photo)
    }

    /// Groups as of every photo submitted before this call
    pub fn snapshot(&self) -> Result<AccumulatorResult, ScanError> {
        let submitter = self.submitter.as_ref().ok_or(ScanError::WorkerStopped)?;
        let (reply, response) = bounded(1);
        submitter
            .commands
            .send(Command::Snapshot(reply))
            .map_err(|_| ScanError::WorkerStopped)?;
        response.recv().map_err(|_| ScanError::WorkerStopped)
    }

    /// Close the channel and wait for the final groups.
    ///
    /// Blocks until every outstanding [`PhotoSubmitter`] is dropped.
    pub fn finish(mut self) -> Result<AccumulatorResult, ScanError> {
        self.submitter.take();
        let worker = self.worker.take().ok_or(ScanError::WorkerStopped)?;
        worker.join().map_err(|_| ScanError::WorkerStopped)
    }
}

/// Stops the worker after the commands already queued, then joins it.
/// Later submissions from surviving [`PhotoSubmitter`]s fail with
/// [`ScanError::WorkerStopped`].
impl Drop for AccumulatorHandle {
    fn drop(&mut self) {
        if let Some(submitter) = self.submitter.take() {
            let _ = submitter.commands.send(Command::Shutdown);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("accumulator worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::duplicates::{DuplicateConfig, DuplicateDetector, EuclideanMetric};
    use crate::core::hasher::PerceptualHash;
    use crate::core::model::FeatureFingerprint;
    use crate::core::similar::SimilarityGrouper;

    fn spawn() -> AccumulatorHandle {
        AccumulatorHandle::spawn(IncrementalScanAccumulator::new(
            DuplicateDetector::new(EuclideanMetric, DuplicateConfig::default()),
            SimilarityGrouper::default(),
        ))
        .unwrap()
    }

    #[test]
    fn photos_from_several_threads_end_up_grouped() {
        let handle = spawn();

        // Bases at least 32 bits apart from each other
        let bases = [0, u64::MAX, 0xFFFF_FFFF, 0xFFFF_FFFF << 32];
        let producers: Vec<_> = bases
            .into_iter()
            .enumerate()
            .map(|(worker, base)| {
                let submitter = handle.submitter().unwrap();
                thread::spawn(move || {
                    for i in 0..5u64 {
                        let photo = PhotoRecord::new(format!("w{worker}-{i}"), 10, 10, 1)
                            .with_hash(PerceptualHash::new(base ^ i));
                        submitter.submit(photo).unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let result = handle.finish().unwrap();
        assert_eq!(result.photos_added, 20);
        assert_eq!(result.similar_groups.len(), 4);
        assert!(result.similar_groups.iter().all(|g| g.len() == 5));
    }

    #[test]
    fn snapshot_sees_earlier_submissions() {
        let handle = spawn();
        let fingerprint = FeatureFingerprint::new(vec![1.0, 1.0]);
        handle
            .submit(PhotoRecord::new("a", 1, 1, 1).with_fingerprint(fingerprint.clone()))
            .unwrap();
        handle
            .submit(PhotoRecord::new("b", 1, 1, 1).with_fingerprint(fingerprint))
            .unwrap();

        let snapshot = handle.snapshot().unwrap();
        assert_eq!(snapshot.duplicate_groups.len(), 1);
        assert_eq!(snapshot.photos_added, 2);

        let result = handle.finish().unwrap();
        assert_eq!(result.duplicate_groups.len(), 1);
    }

    #[test]
    fn dropping_the_handle_does_not_wait_for_submitters() {
        let handle = spawn();
        let submitter = handle.submitter().unwrap();
        submitter
            .submit(PhotoRecord::new("early", 1, 1, 1).with_hash(PerceptualHash::new(0)))
            .unwrap();

        drop(handle);

        let late = PhotoRecord::new("late", 1, 1, 1).with_hash(PerceptualHash::new(0));
        assert!(matches!(submitter.submit(late), Err(ScanError::WorkerStopped)));
    }

    #[test]
    fn empty_actor_finishes_cleanly() {
        let result = spawn().finish().unwrap();
        assert_eq!(result.total_groups(), 0);
        assert_eq!(result.photos_added, 0);
    }
}
