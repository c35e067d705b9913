//! Seeded provider of fabricated values.

use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::Paragraph;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// Number of sentences in a generated paragraph.
const PARAGRAPH_SENTENCES: Range<usize> = 1..4;

/// Deterministic source of human-like strings and bounded integers.
///
/// Every call advances the internal RNG. Two providers built from the same
/// seed return the same values for the same sequence of calls, which is what
/// makes a run reproducible.
pub struct FakeValueProvider {
    seed: u64,
    rng: StdRng,
}

impl FakeValueProvider {
    /// Create a provider seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this provider was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewind to the initial state for the seed.
    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    pub fn next_username(&mut self) -> String {
        Username().fake_with_rng(&mut self.rng)
    }

    pub fn next_email(&mut self) -> String {
        SafeEmail().fake_with_rng(&mut self.rng)
    }

    pub fn next_person_name(&mut self) -> String {
        Name().fake_with_rng(&mut self.rng)
    }

    pub fn next_paragraph(&mut self) -> String {
        Paragraph(PARAGRAPH_SENTENCES).fake_with_rng(&mut self.rng)
    }

    /// Uniform integer in `min..=max`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn next_bounded_int(&mut self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "invalid bounds: min {min} > max {max}");
        self.rng.gen_range(min..=max)
    }
}
