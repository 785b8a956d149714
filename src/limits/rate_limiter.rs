//! Fixed-window admission control keyed by client identifier.

use dashmap::DashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Length of one counting window.
    pub window: Duration,
    /// Admissions allowed per client per window.
    pub max_requests: u32,
    /// Tracked-client count above which expired entries are swept.
    pub max_tracked_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 5,
            max_tracked_clients: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientWindowState {
    count: u32,
    window_start: Instant,
}

/// Per-client request counter over fixed windows.
///
/// Each client's read-modify-write runs under that key's shard lock, so
/// concurrent requests from one client observe a single consistent count
/// while unrelated clients rarely contend.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    clients: DashMap<String, ClientWindowState>,
    last_sweep: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: DashMap::new(),
            last_sweep: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Records one request from `client_id` and reports whether it is admitted.
    pub fn admit(&self, client_id: &str) -> bool {
        self.admit_at(client_id, Instant::now())
    }

    /// [`RateLimiter::admit`] against an explicit clock reading.
    pub fn admit_at(&self, client_id: &str, now: Instant) -> bool {
        let count = {
            let mut state = self
                .clients
                .entry(client_id.to_string())
                .or_insert(ClientWindowState {
                    count: 0,
                    window_start: now,
                });

            if now.saturating_duration_since(state.window_start) > self.config.window {
                state.count = 0;
                state.window_start = now;
            }
            state.count = state.count.saturating_add(1);
            state.count
        };

        // The entry guard must be released before sweeping takes shard locks.
        if self.clients.len() > self.config.max_tracked_clients && self.sweep_due(now) {
            self.sweep(now);
        }

        let allowed = count <= self.config.max_requests;
        if !allowed {
            debug!(
                count,
                max_requests = self.config.max_requests,
                "Client over request budget"
            );
        }
        allowed
    }

    /// Claims the admission-triggered sweep for this window. At most one
    /// claim succeeds per window; a caller that finds the claim held by
    /// another thread skips the sweep.
    fn sweep_due(&self, now: Instant) -> bool {
        let Ok(mut last) = self.last_sweep.try_lock() else {
            return false;
        };
        let due = last.is_none_or(|at| now.saturating_duration_since(at) >= self.config.window);
        if due {
            *last = Some(now);
        }
        due
    }

    /// Evicts clients whose window ended more than one window before `now`.
    /// Returns how many entries were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.clients.len();
        let horizon = self.config.window.saturating_mul(2);
        self.clients
            .retain(|_, state| now.saturating_duration_since(state.window_start) <= horizon);
        let evicted = before.saturating_sub(self.clients.len());

        if evicted > 0 {
            info!(evicted, remaining = self.clients.len(), "Swept expired rate-limit entries");
        }
        evicted
    }

    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}
