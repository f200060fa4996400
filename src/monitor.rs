use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use net::{CancelHandle, ServerAddress, SlpClient, StatusResponse};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch, RwLock};

use crate::{
    history::{HistoryStore, Sample, NO_DATA},
    logging::McstatLogger,
};

/// Pause/terminate switches of the poll loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskControl {
    #[serde(rename = "task-paused")]
    pub paused: bool,
    #[serde(rename = "task-terminated")]
    pub terminated: bool,
}

/// Result of the most recent successful poll.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Unix time in seconds.
    pub time: f64,
    pub status: Arc<StatusResponse>,
}

impl Snapshot {
    pub fn new(status: StatusResponse) -> Self {
        Self {
            time: unix_now(),
            status: Arc::new(status),
        }
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Latest snapshot, written only by the poll loop.
#[derive(Debug, Default)]
pub struct StatusCell {
    latest: RwLock<Option<Snapshot>>,
}

impl StatusCell {
    pub async fn latest(&self) -> Option<Snapshot> {
        self.latest.read().await.clone()
    }

    async fn publish(&self, snapshot: Snapshot) {
        *self.latest.write().await = Some(snapshot);
    }
}

/// Control side of a [`Monitor`], shared with the HTTP layer.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    control: Arc<watch::Sender<TaskControl>>,
    target: Arc<watch::Sender<ServerAddress>>,
    cell: Arc<StatusCell>,
}

impl MonitorHandle {
    pub async fn latest(&self) -> Option<Snapshot> {
        self.cell.latest().await
    }

    pub fn target(&self) -> ServerAddress {
        self.target.borrow().clone()
    }

    pub fn set_target(&self, target: ServerAddress) {
        McstatLogger::target_changed(&target);
        self.target.send_replace(target);
    }

    pub fn control(&self) -> TaskControl {
        *self.control.borrow()
    }

    pub fn set_control(&self, control: TaskControl) {
        McstatLogger::task_toggled(control.paused, control.terminated);
        self.control.send_if_modified(|current| {
            let modified = *current != control;
            *current = control;
            modified
        });
    }
}

/// Cancels the blocking query it guards once the poll future goes away.
struct CancelOnDrop(CancelHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Polls one server on a fixed interval, recording every outcome.
pub struct Monitor {
    client: SlpClient,
    interval: Duration,
    history: Arc<HistoryStore>,
    cell: Arc<StatusCell>,
    control: watch::Receiver<TaskControl>,
    target: watch::Receiver<ServerAddress>,
}

impl Monitor {
    pub fn new(
        client: SlpClient,
        interval: Duration,
        target: ServerAddress,
        history: Arc<HistoryStore>,
    ) -> (Self, MonitorHandle) {
        let (control_tx, control_rx) = watch::channel(TaskControl::default());
        let (target_tx, target_rx) = watch::channel(target);
        let cell = Arc::new(StatusCell::default());

        let handle = MonitorHandle {
            control: Arc::new(control_tx),
            target: Arc::new(target_tx),
            cell: cell.clone(),
        };
        let monitor = Self {
            client,
            interval,
            history,
            cell,
            control: control_rx,
            target: target_rx,
        };
        (monitor, handle)
    }

    /// Queries the current target once and appends the outcome to history.
    /// Failures are logged and recorded as [`NO_DATA`].
    pub async fn poll_once(&self) -> Sample {
        let target = self.target.borrow().clone();
        let client = self.client.clone();
        let lookup = target.clone();
        let cancel = CancelHandle::new();
        let _guard = CancelOnDrop(cancel.clone());

        let query =
            tokio::task::spawn_blocking(move || client.query_cancellable(&lookup, &cancel));
        let online = match query.await {
            Ok(Ok(status)) => {
                let online = status.online();
                McstatLogger::status_updated(&target, online, status.players.max);
                self.cell.publish(Snapshot::new(status)).await;
                online
            }
            Ok(Err(err)) => {
                McstatLogger::poll_failed(&target, &err);
                NO_DATA
            }
            Err(err) => {
                McstatLogger::poll_panicked(&target, &err);
                NO_DATA
            }
        };

        let sample = Sample::now(online);
        if let Err(err) = self.history.append(sample).await {
            McstatLogger::history_write_failed(self.history.path(), &err);
        }
        sample
    }

    /// Runs until terminated through the handle, the handle is dropped, or
    /// `stop` fires. A poll in flight when `stop` fires is cancelled and
    /// leaves no history line.
    pub async fn run(mut self, mut stop: broadcast::Receiver<()>) {
        let interval = self.interval;
        loop {
            let control = *self.control.borrow_and_update();
            if control.terminated {
                break;
            }

            if !control.paused {
                tokio::select! {
                    _ = self.poll_once() => {}
                    _ = stop.recv() => break,
                }
            }

            let wait = async move {
                if control.paused {
                    std::future::pending::<()>().await;
                } else {
                    tokio::time::sleep(interval).await;
                }
            };

            tokio::select! {
                _ = wait => {}
                changed = self.control.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = stop.recv() => break,
            }
        }
        McstatLogger::task_stopped();
    }
}
