use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sliding-window limiter for failed logins, keyed by client address.
#[derive(Clone)]
pub struct RateLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check if the given client is rate-limited. Returns true if blocked.
    /// Also lazily cleans up stale entries for the checked client.
    pub fn is_blocked(&self, client: &str) -> bool {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let Some(cutoff) = Instant::now().checked_sub(self.window) else {
            return map.get(client).is_some_and(|t| t.len() >= self.max_attempts);
        };

        match map.get_mut(client) {
            Some(timestamps) => {
                timestamps.retain(|t| *t > cutoff);
                let blocked = timestamps.len() >= self.max_attempts;
                if timestamps.is_empty() {
                    map.remove(client);
                }
                blocked
            }
            None => false,
        }
    }

    pub fn record_failure(&self, client: &str) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(client.to_string()).or_default().push(Instant::now());
    }

    /// Forget a client's failures (call on successful login).
    pub fn clear(&self, client: &str) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(client);
    }
}
