//! Timecode Value Object
//!
//! コメントが指す動画内の位置（ミリ秒）。
//!
//! ## 不変条件
//! - 0 以上
//! - 24 時間以下
//! - 表示形式: `HH:MM:SS.mmm`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound (24 hours) in milliseconds
pub const TIMECODE_MAX_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimecodeError {
    #[error("Timecode cannot be negative")]
    Negative,

    #[error("Timecode cannot exceed 24 hours")]
    TooLarge,

    #[error("Timecode must look like HH:MM:SS.mmm")]
    Malformed,
}

/// Position inside a video, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Timecode(u32);

impl Timecode {
    pub fn from_millis(ms: i64) -> Result<Self, TimecodeError> {
        if ms < 0 {
            return Err(TimecodeError::Negative);
        }
        if ms > TIMECODE_MAX_MS {
            return Err(TimecodeError::TooLarge);
        }
        Ok(Self(ms as u32))
    }

    /// Restore from the database; out-of-range values are clamped
    pub fn from_db(ms: i32) -> Self {
        Self((ms.max(0) as i64).min(TIMECODE_MAX_MS) as u32)
    }

    #[inline]
    pub const fn as_millis(&self) -> u32 {
        self.0
    }

    /// Value for an INTEGER column
    #[inline]
    pub const fn as_db(&self) -> i32 {
        self.0 as i32
    }
}

impl TryFrom<i64> for Timecode {
    type Error = TimecodeError;

    fn try_from(ms: i64) -> Result<Self, Self::Error> {
        Self::from_millis(ms)
    }
}

impl From<Timecode> for i64 {
    fn from(tc: Timecode) -> Self {
        tc.0 as i64
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0 % 1000;
        let total_secs = self.0 / 1000;
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            total_secs / 3600,
            (total_secs / 60) % 60,
            total_secs % 60,
            ms
        )
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    /// Accepts `HH:MM:SS.mmm`, `HH:MM:SS` and `MM:SS`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (clock, millis) = match s.trim().split_once('.') {
            Some((clock, frac)) => {
                if frac.is_empty() || frac.len() > 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(TimecodeError::Malformed);
                }
                // ".5" is 500 ms
                let padded = format!("{frac:0<3}");
                let ms: i64 = padded.parse().map_err(|_| TimecodeError::Malformed)?;
                (clock, ms)
            }
            None => (s.trim(), 0),
        };

        let parts: Vec<i64> = clock
            .split(':')
            .map(|p| {
                if p.is_empty() || p.len() > 2 || !p.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(TimecodeError::Malformed);
                }
                p.parse::<i64>().map_err(|_| TimecodeError::Malformed)
            })
            .collect::<Result<_, _>>()?;

        let (h, m, sec) = match parts.as_slice() {
            [h, m, s] => (*h, *m, *s),
            [m, s] => (0, *m, *s),
            _ => return Err(TimecodeError::Malformed),
        };
        if m >= 60 || sec >= 60 {
            return Err(TimecodeError::Malformed);
        }

        Self::from_millis(((h * 60 + m) * 60 + sec) * 1000 + millis)
    }
}
