use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config;
use crate::error;

pub const DEFAULT_HEADER_PREFIX: &str = "IAM";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// seen request ids are kept for this long, aligned with the clock skew
/// a signer is allowed
pub const REPLAY_WINDOW_SECS: i64 = 300;
pub const REPLAY_CAPACITY: usize = 4096;

/// bounded cache of request ids the server has already accepted,
/// keyed by the authenticated caller
#[derive(Debug)]
pub struct ReplayCache {
    window: Duration,
    capacity: usize,
    seen: HashMap<(Uuid, Uuid), DateTime<Utc>>,
}

impl ReplayCache {
    pub fn new(window: Duration, capacity: usize) -> Self {
        ReplayCache {
            window,
            capacity,
            seen: HashMap::new(),
        }
    }

    /// true when the id has not been seen inside the window. expired
    /// entries are evicted on the way in so the cache stays bounded
    pub fn check(&mut self, uid: Uuid, request_id: Uuid, now: DateTime<Utc>) -> bool {
        if let Some(seen_at) = self.seen.get(&(uid, request_id)) {
            if now - *seen_at < self.window {
                return false;
            }
        }

        if self.seen.len() >= self.capacity {
            let window = self.window;

            self.seen.retain(|_, seen_at| now - *seen_at < window);
        }

        if self.seen.len() >= self.capacity {
            let oldest = self.seen.iter()
                .min_by_key(|(_, seen_at)| **seen_at)
                .map(|(key, _)| *key);

            if let Some(key) = oldest {
                self.seen.remove(&key);
            }
        }

        self.seen.insert((uid, request_id), now);

        true
    }
}

#[derive(Debug)]
pub struct Sec {
    hostname: String,
    header_prefix: String,
    session_ttl: Duration,
    replay: Mutex<ReplayCache>,
}

impl Sec {
    pub fn builder() -> Builder {
        Builder {
            hostname: None,
            header_prefix: None,
            session_ttl: None,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn header_prefix(&self) -> &str {
        &self.header_prefix
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// lowercase `x-<prefix>-<name>` form used for header lookups
    pub fn header_name(&self, name: &str) -> String {
        format!("x-{}-{}", self.header_prefix.to_lowercase(), name)
    }

    /// false rejects the request. a poisoned cache fails closed
    pub fn check_replay(&self, uid: Uuid, request_id: Uuid) -> bool {
        let Ok(mut cache) = self.replay.lock() else {
            tracing::warn!("replay cache lock poisoned, rejecting request id");

            return false;
        };

        cache.check(uid, request_id, Utc::now())
    }
}

#[derive(Debug)]
pub struct Builder {
    hostname: Option<String>,
    header_prefix: Option<String>,
    session_ttl: Option<u64>,
}

impl Builder {
    pub fn set_hostname(&mut self, hostname: String) -> &mut Self {
        self.hostname = Some(hostname);
        self
    }

    pub fn set_header_prefix(&mut self, prefix: String) -> &mut Self {
        self.header_prefix = Some(prefix);
        self
    }

    pub fn set_session_ttl(&mut self, secs: u64) -> &mut Self {
        self.session_ttl = Some(secs);
        self
    }

    pub fn build(self) -> error::Result<Sec> {
        let Some(hostname) = self.hostname else {
            return Err(error::Error::new()
                .kind("MissingHostname")
                .message(format!(
                    "{}_HOST or --host must be provided",
                    config::ENV_PREFIX
                )));
        };

        let session_ttl = self.session_ttl.unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Ok(Sec {
            hostname,
            header_prefix: self.header_prefix
                .unwrap_or_else(|| String::from(DEFAULT_HEADER_PREFIX)),
            session_ttl: Duration::seconds(session_ttl as i64),
            replay: Mutex::new(ReplayCache::new(
                Duration::seconds(REPLAY_WINDOW_SECS),
                REPLAY_CAPACITY
            )),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cache() -> ReplayCache {
        ReplayCache::new(Duration::seconds(300), 4)
    }

    #[test]
    pub fn duplicate_id_rejected() {
        let mut cache = cache();
        let uid = Uuid::new_v4();
        let request_id = Uuid::new_v4();
        let now = Utc::now();

        assert!(cache.check(uid, request_id, now));
        assert!(!cache.check(uid, request_id, now));
    }

    #[test]
    pub fn same_id_different_user_accepted() {
        let mut cache = cache();
        let request_id = Uuid::new_v4();
        let now = Utc::now();

        assert!(cache.check(Uuid::new_v4(), request_id, now));
        assert!(cache.check(Uuid::new_v4(), request_id, now));
    }

    #[test]
    pub fn id_usable_again_after_window() {
        let mut cache = cache();
        let uid = Uuid::new_v4();
        let request_id = Uuid::new_v4();
        let now = Utc::now();

        assert!(cache.check(uid, request_id, now));
        assert!(cache.check(uid, request_id, now + Duration::seconds(301)));
    }

    #[test]
    pub fn capacity_stays_bounded() {
        let mut cache = cache();
        let uid = Uuid::new_v4();
        let now = Utc::now();

        for _ in 0..32 {
            assert!(cache.check(uid, Uuid::new_v4(), now));
        }

        assert!(cache.seen.len() <= 4);
    }

    #[test]
    pub fn header_names_are_prefixed() {
        let mut builder = Sec::builder();
        builder.set_hostname(String::from("iam.example.com"));

        let sec = builder.build().expect("failed to build sec state");

        assert_eq!(sec.header_name("user-id"), "x-iam-user-id");
        assert_eq!(sec.header_name("request-id"), "x-iam-request-id");
    }
}
