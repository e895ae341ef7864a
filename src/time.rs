use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
            Ok(d) => d,
            Err(_) => Duration::ZERO
        }
    }
}

// test clock. expiry and totp step behavior can be exercised without
// waiting on the wall clock
pub struct ManualClock {
    secs: AtomicU64,
}

impl ManualClock {
    pub fn new(secs: u64) -> Self {
        ManualClock {
            secs: AtomicU64::new(secs),
        }
    }

    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_secs(self.secs.load(Ordering::SeqCst))
    }
}

pub fn utc_to_chrono_datetime(duration: &Duration) -> Option<DateTime<Utc>> {
    let Ok(secs): Result<i64, _> = TryFrom::try_from(duration.as_secs()) else {
        return None;
    };

    DateTime::from_timestamp(secs, duration.subsec_nanos())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new(100);

        assert_eq!(clock.now(), Duration::from_secs(100));

        clock.advance(50);

        assert_eq!(clock.now(), Duration::from_secs(150));

        clock.set(10);

        assert_eq!(clock.now(), Duration::from_secs(10));
    }

    #[test]
    fn chrono_conversion() {
        let converted = utc_to_chrono_datetime(&Duration::from_secs(1_700_000_000))
            .expect("timestamp in range");

        assert_eq!(converted.timestamp(), 1_700_000_000);
    }
}
