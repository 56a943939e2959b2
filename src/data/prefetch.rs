use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

use super::RealBatch;

/// Reads batches on a background thread, at most `depth` ahead of the
/// consumer. Delivery order matches the wrapped iterator.
pub struct Prefetcher {
    receiver: Option<Receiver<RealBatch>>,
    worker: Option<JoinHandle<()>>,
}

impl Prefetcher {
    pub fn new<I>(batches: I, depth: usize) -> Self
    where
        I: Iterator<Item = RealBatch> + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(depth.max(1));
        let worker = std::thread::spawn(move || {
            for batch in batches {
                // Consumer hung up: stop reading.
                if tx.send(batch).is_err() {
                    break;
                }
            }
        });

        Prefetcher {
            receiver: Some(rx),
            worker: Some(worker),
        }
    }
}

impl Iterator for Prefetcher {
    type Item = RealBatch;

    fn next(&mut self) -> Option<RealBatch> {
        self.receiver.as_ref()?.recv().ok()
    }
}

impl Drop for Prefetcher {
    fn drop(&mut self) {
        // Unblock a worker waiting on a full channel before joining it.
        self.receiver.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
