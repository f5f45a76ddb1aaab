//! Rolling-window login attempt tracking and lockout decisions.
//!
//! The tracker keeps one window per submitted identity, including identities
//! that resolve to no known user, so unknown-user and wrong-password
//! attempts behave identically to a probing caller.

use crate::config::SecurityConfig;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

/// Attempts older than this no longer count toward lockout.
const ATTEMPT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy)]
struct AttemptRecord {
    at: DateTime<Utc>,
    success: bool,
}

/// Per-identity attempt window. Obtained through [`AttemptTracker::acquire`],
/// which serializes the check-then-record sequence for one identity.
#[derive(Debug, Default)]
pub struct AttemptWindow {
    attempts: VecDeque<AttemptRecord>,
    locked_at: Option<DateTime<Utc>>,
}

impl AttemptWindow {
    /// Drop attempts that fell out of the rolling window.
    fn prune(&mut self, now: DateTime<Utc>) {
        let horizon = now - Duration::hours(ATTEMPT_WINDOW_HOURS);
        while matches!(self.attempts.front(), Some(record) if record.at < horizon) {
            self.attempts.pop_front();
        }
        if self.attempts.is_empty() {
            self.locked_at = None;
        }
    }

    /// Consecutive failures since the most recent success, inside the window.
    pub fn consecutive_failures(&self) -> u32 {
        let mut count = 0;
        for record in self.attempts.iter().rev() {
            if record.success {
                break;
            }
            count += 1;
        }
        count
    }

    /// Returns the unlock instant while a lockout is active. Lockouts expire
    /// on their own; no explicit unlock exists.
    pub fn is_locked(&mut self, now: DateTime<Utc>, config: &SecurityConfig) -> Option<DateTime<Utc>> {
        self.prune(now);

        let locked_at = self.locked_at?;
        if self.consecutive_failures() < config.max_login_attempts {
            self.locked_at = None;
            return None;
        }

        let unlocks_at = locked_at + Duration::minutes(config.lockout_duration_minutes);
        if now < unlocks_at {
            Some(unlocks_at)
        } else {
            None
        }
    }

    /// Append an attempt. A success clears the consecutive-failure count; a
    /// failure that reaches the threshold begins a lockout at `now`.
    pub fn record(
        &mut self,
        identity: &str,
        success: bool,
        now: DateTime<Utc>,
        config: &SecurityConfig,
    ) {
        self.prune(now);
        self.attempts.push_back(AttemptRecord { at: now, success });

        if success {
            self.locked_at = None;
        } else if self.consecutive_failures() >= config.max_login_attempts {
            self.locked_at = Some(now);
            info!(
                identity,
                failures = self.consecutive_failures(),
                "lockout started after repeated failed logins"
            );
        }
    }

    fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

/// Tracks login attempts per identity and decides lockouts.
///
/// Each identity's window lives behind its own async mutex so the login
/// flow can hold the lock across its whole check-then-record sequence.
/// Two concurrent failing requests for the same identity therefore never
/// both observe "not yet locked".
#[derive(Debug, Default)]
pub struct AttemptTracker {
    windows: DashMap<String, Arc<Mutex<AttemptWindow>>>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take exclusive ownership of one identity's window for the duration of
    /// a login sequence. Identities are expected pre-normalized.
    pub async fn acquire(&self, identity: &str) -> OwnedMutexGuard<AttemptWindow> {
        let cell = self
            .windows
            .entry(identity.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(AttemptWindow::default())))
            .clone();
        cell.lock_owned().await
    }

    /// Read-only lockout probe for callers outside a login sequence.
    pub async fn is_locked(
        &self,
        identity: &str,
        now: DateTime<Utc>,
        config: &SecurityConfig,
    ) -> Option<DateTime<Utc>> {
        let mut window = self.acquire(identity).await;
        window.is_locked(now, config)
    }

    /// Drop identities whose windows emptied out. Windows currently held by
    /// a login sequence are left alone.
    pub fn purge_idle(&self, now: DateTime<Utc>) {
        self.windows.retain(|_, cell| match cell.try_lock() {
            Ok(mut window) => {
                window.prune(now);
                !window.is_empty()
            }
            Err(_) => true,
        });
    }
}
