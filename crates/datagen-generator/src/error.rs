//! Error type for generator configuration.

/// Error type for generator operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeneratorError {
    /// Identities start at 1.
    #[error("Invalid start id {0}: identities must be positive")]
    InvalidStart(i64),

    /// The last identity of the range does not fit in an i64.
    #[error("Identity range starting at {first_id} with {count} records overflows")]
    RangeOverflow { first_id: i64, count: u64 },

    /// Resume point outside the run range.
    #[error("Resume id {id} is outside the run range {first_id}..={last_id}")]
    ResumeOutOfRange { id: i64, first_id: i64, last_id: i64 },

    /// Lifecycle threshold outside the draw domain.
    #[error("Invalid {name} threshold {value}: must be between 1 and {max}")]
    InvalidThreshold {
        name: &'static str,
        value: u32,
        max: u32,
    },
}
