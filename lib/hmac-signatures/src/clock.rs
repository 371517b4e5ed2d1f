//!
//! Time source for signature timestamps
//!

use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, SystemTimeError, UNIX_EPOCH},
};

/// Direction the delta of a mockable clock should be adjusted in
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeltaDirection {
    /// Add to the delta
    Add,

    /// Subtract from the delta
    Sub,
}

/// Handle to adjust the delta of a mockable clock
#[derive(Clone, Debug)]
pub struct MockHandle {
    delta: Arc<AtomicI64>,
}

impl MockHandle {
    /// Adjust the delta by the duration in the direction specified
    pub fn adjust(&self, direction: DeltaDirection, delta: Duration) {
        let mut delta = i64::try_from(delta.as_nanos()).unwrap_or(i64::MAX);
        if direction == DeltaDirection::Sub {
            delta = -delta;
        }

        self.delta.fetch_add(delta, Ordering::AcqRel);
    }

    /// Set the delta to the absolute value in nanoseconds
    pub fn set_delta(&self, delta: i64) {
        self.delta.store(delta, Ordering::Release);
    }
}

#[derive(Clone, Debug, Default)]
enum Source {
    #[default]
    System,
    Fixed(SystemTime),
    Offset(Arc<AtomicI64>),
}

/// Clock the signer and verifier read their timestamps from
///
/// Defaults to the system clock
#[derive(Clone, Debug, Default)]
pub struct Clock {
    source: Source,
}

impl Clock {
    /// Construct a clock reading the system time
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a clock frozen at the given point in time
    #[must_use]
    pub fn fixed(at: SystemTime) -> Self {
        Self {
            source: Source::Fixed(at),
        }
    }

    /// Construct a clock frozen at the given Unix timestamp (in seconds)
    #[must_use]
    pub fn from_unix_timestamp(secs: u64) -> Self {
        Self::fixed(UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Construct a mockable clock
    ///
    /// This clock returns a handle which you can use to adjust the delta to the system time
    #[must_use]
    pub fn mockable() -> (Self, MockHandle) {
        let delta = Arc::new(AtomicI64::default());

        let mock_handle = MockHandle {
            delta: Arc::clone(&delta),
        };
        let clock = Self {
            source: Source::Offset(delta),
        };

        (clock, mock_handle)
    }

    /// Read the current time
    #[must_use]
    pub fn now(&self) -> SystemTime {
        match self.source {
            Source::System => SystemTime::now(),
            Source::Fixed(at) => at,
            Source::Offset(ref delta) => {
                let now = SystemTime::now();
                let ns_delta = delta.load(Ordering::Acquire);

                if ns_delta.is_positive() {
                    now + Duration::from_nanos(ns_delta.unsigned_abs())
                } else {
                    now - Duration::from_nanos(ns_delta.unsigned_abs())
                }
            }
        }
    }

    /// Read the current time as whole seconds since the Unix epoch
    pub fn unix_timestamp(&self) -> Result<u64, SystemTimeError> {
        Ok(self.now().duration_since(UNIX_EPOCH)?.as_secs())
    }
}
