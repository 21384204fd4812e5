//! Worker threads for quickfiler.
//!
//! Listing resolution and file operations run off the event loop. Requests [WorkerTask] go in
//! through per-kind channels and results [WorkerResponse] come back on one shared channel. Every
//! task carries the request id it was issued with, so the session can drop responses that were
//! superseded while in flight.
//!
//! # Caution:
//! This module is the protocol boundary between the session and the engine. Adding or changing
//! variants requires matching changes in the session's response handling.

use crate::core::cache::ResultCache;
use crate::core::fm::CancelToken;
use crate::core::item::ListItem;
use crate::core::listing::{ListingRequest, Resolver};
use crate::core::ops::{self, FileOp, OpOutcome};
use crate::error::FilerError;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, warn};

use std::sync::Arc;
use std::thread;

/// Channels to the listing and file-operation worker threads.
pub struct Workers {
    listing_tx: Sender<WorkerTask>,
    fileop_tx: Sender<WorkerTask>,
    response_rx: Receiver<WorkerResponse>,
}

/// The listing worker drains its queue before each resolution and only runs the newest request,
/// so a burst of keystrokes costs one resolution. File operations run strictly in order.
impl Workers {
    /// Spawns one listing thread and one file-operation thread sharing `resolver` and `cache`.
    pub fn spawn(resolver: Arc<Resolver>, cache: Arc<ResultCache>) -> Self {
        let (listing_tx, listing_rx) = unbounded::<WorkerTask>();
        let (fileop_tx, fileop_rx) = unbounded::<WorkerTask>();
        let (res_tx, response_rx) = unbounded::<WorkerResponse>();

        start_listing_worker(
            listing_rx,
            res_tx.clone(),
            Arc::clone(&resolver),
            Arc::clone(&cache),
        );
        start_fileop_worker(fileop_rx, res_tx, resolver, cache);

        Self {
            listing_tx,
            fileop_tx,
            response_rx,
        }
    }

    #[inline]
    pub fn listing_tx(&self) -> &Sender<WorkerTask> {
        &self.listing_tx
    }

    #[inline]
    pub fn fileop_tx(&self) -> &Sender<WorkerTask> {
        &self.fileop_tx
    }

    #[inline]
    pub fn response_rx(&self) -> &Receiver<WorkerResponse> {
        &self.response_rx
    }
}

pub enum WorkerTask {
    LoadListing {
        request: ListingRequest,
        cancel: CancelToken,
        request_id: u64,
    },
    FileOp {
        op: FileOp,
        request_id: u64,
    },
}

#[derive(Debug)]
pub enum WorkerResponse {
    ListingLoaded {
        request: ListingRequest,
        items: Vec<ListItem>,
        request_id: u64,
    },
    ListingFailed {
        error: FilerError,
        request_id: u64,
    },
    OperationComplete {
        outcome: OpOutcome,
        request_id: u64,
    },
    OperationFailed {
        error: FilerError,
        partially_applied: bool,
        request_id: u64,
    },
}

fn start_listing_worker(
    task_rx: Receiver<WorkerTask>,
    res_tx: Sender<WorkerResponse>,
    resolver: Arc<Resolver>,
    cache: Arc<ResultCache>,
) {
    thread::spawn(move || {
        while let Ok(task) = task_rx.recv() {
            let WorkerTask::LoadListing {
                mut request,
                mut cancel,
                mut request_id,
            } = task
            else {
                continue;
            };

            // Coalesce queued requests, only the latest one is resolved
            while let Ok(next) = task_rx.try_recv() {
                if let WorkerTask::LoadListing {
                    request: r,
                    cancel: c,
                    request_id: id,
                } = next
                {
                    debug!("Listing request {} superseded by {}", request_id, id);
                    request = r;
                    cancel = c;
                    request_id = id;
                }
            }

            if cancel.is_cancelled() {
                continue;
            }

            match cache.load_view(&resolver, &request, &cancel) {
                Ok(items) => {
                    if cancel.is_cancelled() {
                        debug!("Dropping cancelled listing {}", request_id);
                        continue;
                    }
                    let _ = res_tx.send(WorkerResponse::ListingLoaded {
                        request,
                        items,
                        request_id,
                    });
                }
                Err(e) if e.is_cancelled() => {
                    debug!("Listing {} cancelled", request_id);
                }
                Err(error) => {
                    warn!("Listing {:?} failed: {}", request.root, error);
                    let _ = res_tx.send(WorkerResponse::ListingFailed { error, request_id });
                }
            }
        }
    });
}

fn start_fileop_worker(
    task_rx: Receiver<WorkerTask>,
    res_tx: Sender<WorkerResponse>,
    resolver: Arc<Resolver>,
    cache: Arc<ResultCache>,
) {
    thread::spawn(move || {
        while let Ok(task) = task_rx.recv() {
            let WorkerTask::FileOp { op, request_id } = task else {
                continue;
            };

            // The cache is invalidated before the response goes out, so the follow-up listing
            // the session requests always resolves fresh.
            match ops::apply(resolver.fs().as_ref(), op) {
                Ok(outcome) => {
                    cache.invalidate_all();
                    let _ = res_tx.send(WorkerResponse::OperationComplete {
                        outcome,
                        request_id,
                    });
                }
                Err(failure) => {
                    warn!("File operation failed: {}", failure.error);
                    if failure.partially_applied {
                        cache.invalidate_all();
                    }
                    let _ = res_tx.send(WorkerResponse::OperationFailed {
                        error: failure.error,
                        partially_applied: failure.partially_applied,
                        request_id,
                    });
                }
            }
        }
    });
}
