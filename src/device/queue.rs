// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rate-limited command queue for a single device.
//!
//! Firing toggle commands back-to-back freezes the device's local API, so
//! all command traffic for a device funnels through one worker that enforces
//! a minimum spacing between executed commands. Commands for the same relay
//! supersede each other: only the newest pending command per relay survives.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{DeviceError, Error};
use crate::types::{Brightness, RelayAction, RelayIndex};

use super::Hub;

/// Pacing and capacity settings for a [`CommandQueue`].
///
/// # Examples
///
/// ```
/// use tinxy_local::device::QueuePolicy;
/// use std::time::Duration;
///
/// let policy = QueuePolicy::new()
///     .with_min_interval(Duration::from_millis(500))
///     .with_capacity(20);
/// ```
#[derive(Debug, Clone)]
pub struct QueuePolicy {
    min_interval: Duration,
    capacity: usize,
    command_timeout: Duration,
}

impl QueuePolicy {
    /// Default spacing between executed commands.
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);
    /// Default queue capacity.
    pub const DEFAULT_CAPACITY: usize = 50;
    /// Default time a command may wait before it is dropped.
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum spacing between executed commands.
    #[must_use]
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Sets the queue capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets how long a command may wait in the queue before it is dropped.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Returns the minimum spacing between executed commands.
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Returns the queue capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the command timeout.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            min_interval: Self::DEFAULT_MIN_INTERVAL,
            capacity: Self::DEFAULT_CAPACITY,
            command_timeout: Self::DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

#[derive(Debug)]
enum CommandKind {
    Toggle(RelayAction),
    Brightness(Brightness),
}

struct QueuedCommand {
    relay: RelayIndex,
    kind: CommandKind,
    enqueued_at: Instant,
    done: oneshot::Sender<Result<(), Error>>,
}

struct Shared {
    queue: Mutex<VecDeque<QueuedCommand>>,
    notify: Notify,
    shutdown: AtomicBool,
    policy: QueuePolicy,
}

/// Rate-limited command dispatcher for one device.
///
/// # Examples
///
/// ```no_run
/// use tinxy_local::device::{CommandQueue, Hub};
/// use tinxy_local::types::{RelayAction, RelayIndex};
///
/// # async fn example() -> tinxy_local::Result<()> {
/// let hub = Hub::new("192.168.1.50", "64a1", "mqtt-pass")?;
/// let queue = CommandQueue::new(hub);
///
/// queue.toggle(RelayIndex::one(), RelayAction::On).await?;
///
/// queue.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct CommandQueue {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CommandQueue {
    /// Creates a queue with the default policy.
    #[must_use]
    pub fn new(hub: Hub) -> Self {
        Self::with_policy(hub, QueuePolicy::default())
    }

    /// Creates a queue with an explicit policy.
    #[must_use]
    pub fn with_policy(hub: Hub, policy: QueuePolicy) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            shutdown: AtomicBool::new(false),
            policy,
        });

        let worker = tokio::spawn(run_worker(hub, Arc::clone(&shared)));

        Self {
            shared,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queues a toggle and waits for it to execute.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Superseded`] when a newer command for the same
    /// relay replaced this one, [`DeviceError::QueueFull`] when the queue is
    /// at capacity, [`DeviceError::QueueTimeout`] when the command waited too
    /// long, or the execution error from the device.
    pub async fn toggle(&self, relay: RelayIndex, action: RelayAction) -> Result<(), Error> {
        self.submit(relay, CommandKind::Toggle(action)).await
    }

    /// Queues a brightness change and waits for it to execute.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`toggle`](Self::toggle).
    pub async fn set_brightness(
        &self,
        relay: RelayIndex,
        brightness: Brightness,
    ) -> Result<(), Error> {
        self.submit(relay, CommandKind::Brightness(brightness)).await
    }

    /// Returns the number of pending commands.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Stops the worker. Pending commands complete with an error.
    pub async fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.notify.notify_one();

        let worker = self.worker.lock().take();
        if let Some(handle) = worker {
            let _ = handle.await;
        }
    }

    async fn submit(&self, relay: RelayIndex, kind: CommandKind) -> Result<(), Error> {
        if self.shared.shutdown.load(Ordering::SeqCst) {
            return Err(DeviceError::ShuttingDown.into());
        }

        let (tx, rx) = oneshot::channel();

        {
            let mut queue = self.shared.queue.lock();

            if queue.len() >= self.shared.policy.capacity {
                tracing::warn!(
                    pending = queue.len(),
                    limit = self.shared.policy.capacity,
                    "Command queue full"
                );
                return Err(DeviceError::QueueFull {
                    limit: self.shared.policy.capacity,
                }
                .into());
            }

            // Supersede pending commands for the same relay.
            let mut superseded = 0usize;
            let mut kept = VecDeque::with_capacity(queue.len() + 1);
            while let Some(cmd) = queue.pop_front() {
                if cmd.relay == relay {
                    let _ = cmd.done.send(Err(DeviceError::Superseded.into()));
                    superseded += 1;
                } else {
                    kept.push_back(cmd);
                }
            }
            *queue = kept;

            if superseded > 0 {
                tracing::debug!(
                    relay = relay.value(),
                    superseded,
                    "Replaced pending commands for relay"
                );
            }

            queue.push_back(QueuedCommand {
                relay,
                kind,
                enqueued_at: Instant::now(),
                done: tx,
            });
        }

        self.shared.notify.notify_one();

        rx.await
            .map_err(|_| Error::from(DeviceError::ShuttingDown))?
    }
}

async fn run_worker(hub: Hub, shared: Arc<Shared>) {
    tracing::debug!(device_id = %hub.device_id(), "Command worker started");

    let mut last_run: Option<Instant> = None;

    'worker: loop {
        loop {
            if shared.shutdown.load(Ordering::SeqCst) {
                break 'worker;
            }
            if !shared.queue.lock().is_empty() {
                break;
            }
            shared.notify.notified().await;
        }

        // Pace before taking the command, so it stays in the queue and can
        // still be superseded while we wait. A shutdown that lands during
        // the pacing window drains the command instead of executing it.
        if let Some(last) = last_run {
            tokio::time::sleep_until(last + shared.policy.min_interval).await;
            if shared.shutdown.load(Ordering::SeqCst) {
                break;
            }
        }

        let Some(cmd) = shared.queue.lock().pop_front() else {
            continue;
        };

        if cmd.enqueued_at.elapsed() > shared.policy.command_timeout {
            #[allow(clippy::cast_possible_truncation)]
            let waited = cmd.enqueued_at.elapsed().as_millis() as u64;
            tracing::warn!(
                device_id = %hub.device_id(),
                relay = cmd.relay.value(),
                waited_ms = waited,
                "Dropping stale queued command"
            );
            let _ = cmd.done.send(Err(DeviceError::QueueTimeout(waited).into()));
            continue;
        }

        let result = match cmd.kind {
            CommandKind::Toggle(action) => hub.toggle(cmd.relay, action).await,
            CommandKind::Brightness(brightness) => {
                hub.set_brightness(cmd.relay, brightness).await
            }
        };

        last_run = Some(Instant::now());
        let _ = cmd.done.send(result);
    }

    // Fail whatever is still pending.
    let mut queue = shared.queue.lock();
    while let Some(cmd) = queue.pop_front() {
        let _ = cmd.done.send(Err(DeviceError::ShuttingDown.into()));
    }

    tracing::debug!(device_id = %hub.device_id(), "Command worker stopped");
}
