//! Ordered snapshot writers.
//!
//! # Responsibility
//! - Accept full-store snapshots without blocking callers on storage.
//! - Commit snapshots in submission order (last writer wins).
//!
//! # Invariants
//! - A later snapshot is never overwritten by an earlier one.
//! - Write failures are reported to the diagnostic sink and dropped.
//! - Dropping a `BackgroundWriter` drains every queued snapshot.

use crate::diagnostics::DiagnosticSink;
use crate::store::blob::BlobStore;
use crate::store::snapshot::save;
use crate::store::SemesterStore;
use log::{debug, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

/// Destination of full-store snapshots produced after each mutation.
pub trait SnapshotWriter {
    /// Queues or performs one write of `store`.
    fn submit(&mut self, store: &SemesterStore);

    /// Blocks until every submitted snapshot has been committed.
    fn flush(&mut self) {}
}

/// Writes synchronously on the caller thread.
pub struct DirectWriter<B, D> {
    blob: B,
    sink: D,
}

impl<B: BlobStore, D: DiagnosticSink> DirectWriter<B, D> {
    pub fn new(blob: B, sink: D) -> Self {
        Self { blob, sink }
    }

    pub fn blob(&self) -> &B {
        &self.blob
    }
}

impl<B: BlobStore, D: DiagnosticSink> SnapshotWriter for DirectWriter<B, D> {
    fn submit(&mut self, store: &SemesterStore) {
        save(store, &self.blob, &self.sink);
    }
}

enum WriterMessage {
    Write(Box<SemesterStore>),
    Flush(Sender<()>),
}

/// Writes on one worker thread fed by a FIFO channel.
pub struct BackgroundWriter {
    sender: Option<Sender<WriterMessage>>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundWriter {
    /// Spawns the worker owning `blob` and `sink`.
    ///
    /// # Errors
    /// - Returns the spawn error when the OS refuses a new thread.
    pub fn spawn<B, D>(blob: B, sink: D) -> std::io::Result<Self>
    where
        B: BlobStore + Send + 'static,
        D: DiagnosticSink + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("gradebook-writer".to_string())
            .spawn(move || run_worker(receiver, blob, sink))?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    fn send(&self, message: WriterMessage) -> bool {
        self.sender
            .as_ref()
            .is_some_and(|sender| sender.send(message).is_ok())
    }
}

impl SnapshotWriter for BackgroundWriter {
    fn submit(&mut self, store: &SemesterStore) {
        if !self.send(WriterMessage::Write(Box::new(store.clone()))) {
            warn!("event=store_save module=store status=dropped reason=writer_stopped");
        }
    }

    fn flush(&mut self) {
        let (ack_sender, ack_receiver) = mpsc::channel();
        if self.send(WriterMessage::Flush(ack_sender)) {
            // Err means the worker exited; nothing is left to wait for.
            let _ = ack_receiver.recv();
        }
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish the queue and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("event=store_writer_stop module=store status=error reason=worker_panicked");
            }
        }
    }
}

fn run_worker<B: BlobStore, D: DiagnosticSink>(
    receiver: Receiver<WriterMessage>,
    blob: B,
    sink: D,
) {
    let mut written = 0_u64;
    for message in receiver {
        match message {
            WriterMessage::Write(store) => {
                if save(&store, &blob, &sink) {
                    written += 1;
                }
            }
            WriterMessage::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("event=store_writer_stop module=store status=ok written={written}");
}

#[cfg(test)]
mod tests {
    use super::{BackgroundWriter, DirectWriter, SnapshotWriter};
    use crate::diagnostics::LogDiagnostics;
    use crate::model::semester::{ManualField, SemesterKey};
    use crate::model::value::InputValue;
    use crate::store::blob::{BlobStore, MemoryBlobStore};
    use crate::store::snapshot::{decode, SEMESTERS_BLOB_KEY};
    use crate::store::{default_store, SemesterStore};
    use std::sync::Arc;

    fn persisted(blob: &impl BlobStore) -> SemesterStore {
        let raw = blob
            .get(SEMESTERS_BLOB_KEY)
            .expect("get succeeds")
            .expect("snapshot present");
        decode(&raw).expect("snapshot decodes").0
    }

    #[test]
    fn background_writes_commit_in_submission_order() {
        let blob = Arc::new(MemoryBlobStore::new());
        let mut writer =
            BackgroundWriter::spawn(Arc::clone(&blob), LogDiagnostics).expect("worker spawns");
        let mut store = default_store();
        for index in 0..50 {
            store
                .get_mut(SemesterKey::Y1S1)
                .set_manual_field(ManualField::TotalCredits, InputValue::from(index.to_string()));
            writer.submit(&store);
        }
        writer.flush();

        assert_eq!(persisted(&blob), store);
    }

    #[test]
    fn dropping_background_writer_drains_queue() {
        let blob = Arc::new(MemoryBlobStore::new());
        let mut store = default_store();
        {
            let mut writer =
                BackgroundWriter::spawn(Arc::clone(&blob), LogDiagnostics).expect("worker spawns");
            writer.submit(&store);
            store.get_mut(SemesterKey::Y3S1).subjects.clear();
            writer.submit(&store);
        }
        assert!(persisted(&blob).get(SemesterKey::Y3S1).subjects.is_empty());
    }

    #[test]
    fn direct_writer_writes_immediately() {
        let store = default_store();
        let mut writer = DirectWriter::new(MemoryBlobStore::new(), LogDiagnostics);
        writer.submit(&store);
        assert_eq!(persisted(writer.blob()), store);
    }
}
