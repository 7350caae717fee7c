// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequential dispatch queue with a single paced drain worker.
//!
//! Handlers call [`DispatchQueue::enqueue`] and return immediately. One
//! worker task, started with [`DispatchQueue::spawn_worker`], pops tasks in
//! FIFO order and delivers them one at a time through the [`Transport`],
//! sleeping a randomized interval between deliveries while work remains.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use courier_core::{
    CourierError, DeliveryOutcome, HistoryEntry, ImageFetcher, PendingTask, SendTask,
    StatusRecord, TaskPayload, Transport, normalize,
};

use crate::history::HistoryStore;
use crate::pacing::PacingPolicy;
use crate::status::StatusTable;

/// A task waiting in the queue, with the time it was accepted.
#[derive(Debug)]
struct Queued {
    task: SendTask,
    queued_at: DateTime<Utc>,
}

/// FIFO of pending send tasks plus the worker that drains it.
pub struct DispatchQueue {
    pending: Mutex<VecDeque<Queued>>,
    wake: Notify,
    draining: AtomicBool,
    worker_running: AtomicBool,
    status: Arc<StatusTable>,
    history: Arc<HistoryStore>,
    transport: Arc<dyn Transport>,
    fetcher: Arc<dyn ImageFetcher>,
    pacing: PacingPolicy,
}

impl DispatchQueue {
    pub fn new(
        transport: Arc<dyn Transport>,
        fetcher: Arc<dyn ImageFetcher>,
        status: Arc<StatusTable>,
        history: Arc<HistoryStore>,
        pacing: PacingPolicy,
    ) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            wake: Notify::new(),
            draining: AtomicBool::new(false),
            worker_running: AtomicBool::new(false),
            status,
            history,
            transport,
            fetcher,
            pacing,
        }
    }

    pub fn status(&self) -> &Arc<StatusTable> {
        &self.status
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Appends `task` and returns its 1-based queue position.
    ///
    /// The status record is created under the same lock as the push, so the
    /// returned position matches the task's index at that instant.
    pub fn enqueue(&self, task: SendTask) -> usize {
        let task_id = task.id.clone();
        let kind = task.kind();

        let position = {
            let mut pending = self.lock_pending();
            let position = pending.len() + 1;
            let record = StatusRecord::queued(&task, position);
            let queued_at = record.queued_at;
            self.status.insert(record);
            pending.push_back(Queued { task, queued_at });
            position
        };

        info!(task_id = %task_id, kind = %kind, position, "task enqueued");
        self.wake.notify_one();
        position
    }

    /// Tasks not yet picked up by the worker, in dispatch order.
    pub fn list_pending(&self) -> Vec<PendingTask> {
        self.lock_pending()
            .iter()
            .enumerate()
            .map(|(index, queued)| PendingTask {
                position: index + 1,
                task_id: queued.task.id.clone(),
                kind: queued.task.kind(),
                recipient: queued.task.recipient.clone(),
                queued_at: queued.queued_at,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock_pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_pending().is_empty()
    }

    /// Whether the worker is inside a drain pass.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Starts the drain worker.
    ///
    /// Only one worker may be alive per queue; a second call while the first
    /// is still running returns an error.
    pub fn spawn_worker(
        self: &Arc<Self>,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>, CourierError> {
        if self
            .worker_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CourierError::Internal(
                "dispatch worker is already running".to_string(),
            ));
        }

        let queue = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let _running = FlagGuard(&queue.worker_running);
            queue.run(cancel).await;
        }))
    }

    async fn run(&self, cancel: CancellationToken) {
        info!(transport = self.transport.name(), "dispatch worker started");

        loop {
            self.drain(&cancel).await;
            if cancel.is_cancelled() {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.wake.notified() => {}
            }
        }

        let dropped = self.len();
        if dropped > 0 {
            warn!(dropped, "dispatch worker stopping with pending tasks");
        }
        info!("dispatch worker stopped");
    }

    /// Delivers tasks until the queue is empty or shutdown is requested.
    async fn drain(&self, cancel: &CancellationToken) {
        self.draining.store(true, Ordering::Release);
        let _draining = FlagGuard(&self.draining);

        while let Some(queued) = self.pop() {
            self.process(queued.task).await;

            if cancel.is_cancelled() {
                break;
            }
            if self.is_empty() {
                break;
            }

            let delay = self.pacing.next_delay();
            debug!(delay_secs = delay.as_secs_f64(), "pacing before next delivery");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => break,
            }
        }
    }

    /// Runs one task to a terminal state and records the outcome.
    async fn process(&self, task: SendTask) {
        let task_id = task.id.as_str();
        self.status.mark_processing(task_id);
        debug!(task_id, kind = %task.kind(), "processing task");

        // A panic inside the transport surfaces here as a JoinError.
        let delivery = tokio::spawn(deliver(
            Arc::clone(&self.transport),
            Arc::clone(&self.fetcher),
            self.pacing,
            task.clone(),
        ));
        let result = match delivery.await {
            Ok(result) => result,
            Err(e) => Err(CourierError::Internal(format!("delivery aborted: {e}"))),
        };

        match result {
            Ok(()) => {
                self.status.mark_sent(task_id);
                self.history
                    .record(HistoryEntry::for_task(&task, DeliveryOutcome::Sent, None));
                info!(task_id, kind = %task.kind(), "task delivered");
            }
            Err(e) => {
                let message = e.to_string();
                self.status.mark_failed(task_id, message.clone());
                self.history.record(HistoryEntry::for_task(
                    &task,
                    DeliveryOutcome::Failed,
                    Some(message),
                ));
                warn!(task_id, kind = %task.kind(), error = %e, "task delivery failed");
            }
        }
    }

    fn pop(&self) -> Option<Queued> {
        self.lock_pending().pop_front()
    }

    fn lock_pending(&self) -> MutexGuard<'_, VecDeque<Queued>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn deliver(
    transport: Arc<dyn Transport>,
    fetcher: Arc<dyn ImageFetcher>,
    pacing: PacingPolicy,
    task: SendTask,
) -> Result<(), CourierError> {
    // Readiness can change between enqueue and dispatch.
    if !transport.is_ready() {
        return Err(CourierError::NotReady);
    }

    let chat_id = normalize(&task.recipient);
    match &task.payload {
        TaskPayload::Text { text } => {
            let typing = pacing.typing_delay();
            if !typing.is_zero() {
                tokio::time::sleep(typing).await;
            }
            transport.send_text(&chat_id, text).await
        }
        TaskPayload::Image { image_url, caption } => {
            let image = fetcher.fetch(image_url).await?;
            debug!(
                task_id = task.id.as_str(),
                bytes = image.bytes.len(),
                mime_type = image.mime_type.as_str(),
                "image fetched"
            );
            transport
                .send_image(
                    &chat_id,
                    &image.bytes,
                    &image.mime_type,
                    caption.as_deref().unwrap_or(""),
                )
                .await
        }
    }
}

/// Clears a flag when dropped, including during unwinding.
struct FlagGuard<'a>(&'a AtomicBool);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("len", &self.len())
            .field("draining", &self.is_draining())
            .field("transport", &self.transport.name())
            .field("pacing", &self.pacing)
            .finish()
    }
}
