//! Windows FILETIME timestamps.
//!
//! Archive records store a file's last-write time as a Windows FILETIME:
//! a 64-bit count of 100-nanosecond intervals since January 1, 1601 (UTC).
//! [`Timestamp`] wraps that raw value so it round-trips bit-for-bit on
//! Windows, and converts to and from [`SystemTime`] and
//! [`filetime::FileTime`] elsewhere.
//!
//! # Example
//!
//! ```rust
//! use ntfs_streams::Timestamp;
//! use std::time::SystemTime;
//!
//! let ts = Timestamp::from_filetime(116444736000000000);
//! assert_eq!(ts.as_unix_secs(), 0);
//! assert_eq!(ts.as_system_time(), SystemTime::UNIX_EPOCH);
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Difference between the FILETIME epoch (1601) and the Unix epoch (1970)
/// in 100-nanosecond intervals.
const FILETIME_UNIX_DIFF: u64 = 116444736000000000;

/// Number of 100-nanosecond intervals per second.
const INTERVALS_PER_SECOND: u64 = 10_000_000;

/// A last-write time as stored in an archive record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    /// Raw FILETIME value (100-nanosecond intervals since 1601-01-01)
    filetime: u64,
}

impl Timestamp {
    /// Creates a timestamp from a raw Windows FILETIME value.
    #[inline]
    pub const fn from_filetime(filetime: u64) -> Self {
        Self { filetime }
    }

    /// Returns the raw Windows FILETIME value.
    #[inline]
    pub const fn as_filetime(&self) -> u64 {
        self.filetime
    }

    /// Creates a timestamp from Unix seconds and nanoseconds.
    ///
    /// Nanoseconds are truncated to 100ns precision. Returns `None` if the
    /// time cannot be represented as a FILETIME.
    pub fn from_unix_secs_nanos(secs: i64, nanos: u32) -> Option<Self> {
        let nano_intervals = u64::from(nanos) / 100;
        let base = if secs < 0 {
            let neg_intervals = secs.unsigned_abs().checked_mul(INTERVALS_PER_SECOND)?;
            FILETIME_UNIX_DIFF.checked_sub(neg_intervals)?
        } else {
            let intervals = (secs as u64).checked_mul(INTERVALS_PER_SECOND)?;
            FILETIME_UNIX_DIFF.checked_add(intervals)?
        };
        base.checked_add(nano_intervals).map(Self::from_filetime)
    }

    /// Creates a timestamp from a `SystemTime`.
    pub fn from_system_time(time: SystemTime) -> Option<Self> {
        match time.duration_since(UNIX_EPOCH) {
            Ok(duration) => {
                Self::from_unix_secs_nanos(duration.as_secs() as i64, duration.subsec_nanos())
            }
            Err(e) => {
                let duration = e.duration();
                let intervals = duration.as_secs().checked_mul(INTERVALS_PER_SECOND)?
                    + u64::from(duration.subsec_nanos()) / 100;
                FILETIME_UNIX_DIFF
                    .checked_sub(intervals)
                    .map(Self::from_filetime)
            }
        }
    }

    /// Returns the timestamp as whole Unix seconds, rounding towards negative
    /// infinity.
    pub fn as_unix_secs(&self) -> i64 {
        if self.filetime >= FILETIME_UNIX_DIFF {
            ((self.filetime - FILETIME_UNIX_DIFF) / INTERVALS_PER_SECOND) as i64
        } else {
            let intervals = FILETIME_UNIX_DIFF - self.filetime;
            -(intervals.div_ceil(INTERVALS_PER_SECOND) as i64)
        }
    }

    /// Returns the 100ns part of the timestamp within its second, in
    /// nanoseconds.
    pub fn subsec_nanos(&self) -> u32 {
        let secs = self.as_unix_secs();
        let whole = secs as i128 * INTERVALS_PER_SECOND as i128 + FILETIME_UNIX_DIFF as i128;
        ((self.filetime as i128 - whole) * 100) as u32
    }

    /// Converts to a `SystemTime`.
    pub fn as_system_time(&self) -> SystemTime {
        if self.filetime >= FILETIME_UNIX_DIFF {
            let intervals = self.filetime - FILETIME_UNIX_DIFF;
            UNIX_EPOCH + intervals_to_duration(intervals)
        } else {
            let intervals = FILETIME_UNIX_DIFF - self.filetime;
            UNIX_EPOCH - intervals_to_duration(intervals)
        }
    }

    /// Converts to a [`filetime::FileTime`] for applying to a file.
    pub fn to_file_time(&self) -> filetime::FileTime {
        filetime::FileTime::from_unix_time(self.as_unix_secs(), self.subsec_nanos())
    }

    /// Creates a timestamp from a [`filetime::FileTime`].
    pub fn from_file_time(time: filetime::FileTime) -> Option<Self> {
        Self::from_unix_secs_nanos(time.unix_seconds(), time.nanoseconds())
    }
}

fn intervals_to_duration(intervals: u64) -> Duration {
    Duration::new(
        intervals / INTERVALS_PER_SECOND,
        ((intervals % INTERVALS_PER_SECOND) * 100) as u32,
    )
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> Self {
        ts.as_system_time()
    }
}
