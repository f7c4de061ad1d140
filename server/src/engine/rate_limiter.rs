use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Token-bucket rate limiter keyed by string (client IP, user id).
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    burst: u32,
    /// Tokens added per second.
    refill_rate: f64,
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// `burst` is the bucket capacity; one token is refilled every
    /// `per_seconds` seconds.
    pub fn new(burst: u32, per_seconds: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            burst,
            refill_rate: 1.0 / per_seconds,
        }
    }

    /// Take one token for `key`. Returns false when the bucket is empty.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.burst as f64,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.burst as f64);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drop buckets idle for longer than `idle`.
    pub fn prune(&self, idle: Duration) {
        let Some(cutoff) = Instant::now().checked_sub(idle) else {
            return;
        };
        self.buckets.retain(|_, b| b.last_refill > cutoff);
    }

    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewind(limiter: &RateLimiter, key: &str, secs: u64) {
        let mut bucket = limiter.buckets.get_mut(key).unwrap();
        bucket.last_refill = Instant::now() - Duration::from_secs(secs);
    }

    #[test]
    fn test_burst_then_deny() {
        let limiter = RateLimiter::new(3, 1.0);
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, 1.0);
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
    }

    #[test]
    fn test_refill_capped_at_burst() {
        let limiter = RateLimiter::new(2, 1.0);
        assert!(limiter.check("ip"));
        rewind(&limiter, "ip", 100);
        assert!(limiter.check("ip"));
        assert!(limiter.check("ip"));
        assert!(!limiter.check("ip"));
    }

    #[test]
    fn test_slow_refill() {
        let limiter = RateLimiter::new(1, 4.0);
        assert!(limiter.check("ip"));
        rewind(&limiter, "ip", 2);
        assert!(!limiter.check("ip"));
        rewind(&limiter, "ip", 4);
        assert!(limiter.check("ip"));
    }

    #[test]
    fn test_prune() {
        let limiter = RateLimiter::new(5, 1.0);
        limiter.check("old");
        limiter.check("fresh");
        rewind(&limiter, "old", 600);
        limiter.prune(Duration::from_secs(60));
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
