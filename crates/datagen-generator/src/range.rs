//! Identity ranges and seed derivation for a run.

use crate::records::Identity;
use crate::GeneratorError;
use serde::{Deserialize, Serialize};

/// Seed stream used for fabricated values.
pub const VALUES_STREAM: u64 = 0;
/// Seed stream used for lifecycle decisions.
pub const LIFECYCLE_STREAM: u64 = 1;

/// Derive the seed of an independent stream from the run seed.
pub fn stream_seed(seed: u64, stream: u64) -> u64 {
    seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Contiguous identities processed by a run, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRange {
    first_id: Identity,
    count: u64,
}

impl RunRange {
    pub fn new(first_id: Identity, count: u64) -> Result<Self, GeneratorError> {
        if first_id < 1 {
            return Err(GeneratorError::InvalidStart(first_id));
        }
        if count > 0 {
            let span = i64::try_from(count - 1)
                .map_err(|_| GeneratorError::RangeOverflow { first_id, count })?;
            first_id
                .checked_add(span)
                .ok_or(GeneratorError::RangeOverflow { first_id, count })?;
        }
        Ok(Self { first_id, count })
    }

    /// Range `1..=count`.
    pub fn from_count(count: u64) -> Result<Self, GeneratorError> {
        Self::new(1, count)
    }

    pub fn first_id(&self) -> Identity {
        self.first_id
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Last identity of the range, `None` when empty.
    pub fn last_id(&self) -> Option<Identity> {
        // Overflow was ruled out in `new`.
        (self.count > 0).then(|| self.first_id + (self.count as i64 - 1))
    }

    pub fn contains(&self, id: Identity) -> bool {
        self.last_id()
            .is_some_and(|last| (self.first_id..=last).contains(&id))
    }

    pub fn ids(&self) -> impl Iterator<Item = Identity> + '_ {
        (0..self.count).map(move |offset| self.first_id + offset as i64)
    }

    /// Number of identities before `id` in this range.
    ///
    /// Used when resuming: those identities already committed and only need
    /// their random draws replayed.
    pub fn position_of(&self, id: Identity) -> Result<u64, GeneratorError> {
        if self.contains(id) {
            return Ok((id - self.first_id) as u64);
        }
        Err(GeneratorError::ResumeOutOfRange {
            id,
            first_id: self.first_id,
            last_id: self.last_id().unwrap_or(self.first_id - 1),
        })
    }
}
