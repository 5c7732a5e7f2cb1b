//! Results object names.
//!
//! Names follow the format gcloud uses for its own generated results
//! directories, e.g. `2017-07-12_11:36:12.467586_XVlB`: a local timestamp with
//! microseconds, then four random ASCII letters.
//!
//! Uniqueness is practical, not guaranteed. Two names generated in the same
//! microsecond collide with probability 1/52^4 (about 1 in 7.3 million).

use chrono::{Local, NaiveDateTime};
use rand::Rng;
use std::fmt;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 4;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%-H:%M:%S%.6f";

/// Destination path segment for one run's results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultsObjectName(String);

impl ResultsObjectName {
    /// Generate a name for the current local time.
    pub fn new() -> Self {
        Self::generate(Local::now().naive_local(), &mut rand::thread_rng())
    }

    /// Generate a name for a given time and randomness source.
    pub fn generate<R: Rng>(at: NaiveDateTime, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
            .collect();
        Self(format!("{}_{}", at.format(TIMESTAMP_FORMAT), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResultsObjectName {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResultsObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResultsObjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ResultsObjectName> for String {
    fn from(name: ResultsObjectName) -> Self {
        name.0
    }
}
