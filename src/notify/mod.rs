//! Transient notifications
//!
//! Each notification owns its own expiry timer on the shared [`Scheduler`].
//! Timers are independent: expiring or dismissing one notification never
//! changes the remaining lifetime of another.

use crate::scheduler::{Scheduler, TaskHandle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default time a notification stays active
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => f.write_str("success"),
            NotificationKind::Error => f.write_str("error"),
            NotificationKind::Info => f.write_str("info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct NotificationState {
    active: BTreeMap<u64, (Notification, TaskHandle)>,
    last_id: u64,
}

impl NotificationState {
    /// Wall-clock milliseconds, bumped past the previous id on collision
    fn next_id(&mut self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last_id + 1);
        self.last_id = id;
        id
    }
}

/// Queue of active, self-expiring notifications
#[derive(Clone)]
pub struct NotificationCenter {
    scheduler: Scheduler,
    state: Arc<Mutex<NotificationState>>,
    default_ttl: Duration,
}

impl NotificationCenter {
    pub fn new(scheduler: Scheduler) -> Self {
        Self::with_default_ttl(scheduler, DEFAULT_NOTIFICATION_TTL)
    }

    pub fn with_default_ttl(scheduler: Scheduler, default_ttl: Duration) -> Self {
        Self {
            scheduler,
            state: Arc::default(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Push a notification that expires after `ttl`
    ///
    /// Expiry needs a tokio runtime; pushed outside one, the notification
    /// stays until dismissed.
    pub fn push(&self, message: impl Into<String>, kind: NotificationKind, ttl: Duration) -> u64 {
        let message = message.into();
        match kind {
            NotificationKind::Error => tracing::warn!("Notification: {}", message),
            _ => tracing::info!("Notification: {}", message),
        }

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let created_at = Utc::now();
        let id = state.next_id(created_at);

        let expiring = Arc::clone(&self.state);
        let timer = self.scheduler.schedule_after(ttl, move || {
            let mut state = expiring.lock().unwrap_or_else(|e| e.into_inner());
            if state.active.remove(&id).is_some() {
                tracing::debug!("Notification {} expired", id);
            }
        });

        let notification = Notification {
            id,
            message,
            kind,
            created_at,
        };
        state.active.insert(id, (notification, timer));
        id
    }

    /// Push a notification with the default lifetime
    pub fn push_default(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.push(message, kind, self.default_ttl)
    }

    /// Remove a notification before it expires
    pub fn dismiss(&self, id: u64) -> bool {
        let removed = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.active.remove(&id)
        };
        match removed {
            Some((_, timer)) => {
                self.scheduler.cancel(timer);
                true
            }
            None => false,
        }
    }

    /// Active notifications, oldest first
    pub fn active(&self) -> Vec<Notification> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.active.values().map(|(n, _)| n.clone()).collect()
    }

    pub fn get(&self, id: u64) -> Option<Notification> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.active.get(&id).map(|(n, _)| n.clone())
    }

    pub fn is_empty(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.active.is_empty()
    }

    /// Dismiss everything
    pub fn clear(&self) {
        let drained: Vec<TaskHandle> = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut state.active)
                .into_values()
                .map(|(_, timer)| timer)
                .collect()
        };
        for timer in drained {
            self.scheduler.cancel(timer);
        }
    }
}
