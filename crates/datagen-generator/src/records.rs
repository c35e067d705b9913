//! User and product records and the factory that fabricates them.

use crate::provider::FakeValueProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shared primary key of a user record and its product record.
pub type Identity = i64;

/// Smallest price in cents.
pub const MIN_PRICE_CENTS: i64 = 1;
/// Largest price in cents.
pub const MAX_PRICE_CENTS: i64 = 999_999;

/// Upper bound on redraws when a fresh value collides with the current one.
const MAX_REDRAWS: usize = 16;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Identity,
    pub username: String,
    pub email: String,
}

/// A row of the `products` table, correlated with a [`UserRecord`] by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Identity,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// Builds records from a [`FakeValueProvider`].
///
/// Each build consumes the same number of provider calls in the same order
/// no matter which identity is passed in. The identity is attached to the
/// record but never influences its content, so output depends only on the
/// position in the call sequence.
pub struct RecordFactory {
    provider: FakeValueProvider,
}

impl RecordFactory {
    pub fn new(provider: FakeValueProvider) -> Self {
        Self { provider }
    }

    /// Create a factory over a fresh provider seeded with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(FakeValueProvider::new(seed))
    }

    pub fn build_user(&mut self, id: Identity) -> UserRecord {
        let username = self.provider.next_username();
        let email = self.provider.next_email();
        UserRecord {
            id,
            username,
            email,
        }
    }

    pub fn build_product(&mut self, id: Identity) -> ProductRecord {
        let name = self.provider.next_person_name();
        let description = self.provider.next_paragraph();
        let cents = self
            .provider
            .next_bounded_int(MIN_PRICE_CENTS, MAX_PRICE_CENTS);
        ProductRecord {
            id,
            name,
            description,
            price: Decimal::new(cents, 2),
        }
    }

    /// Draw a username for an update, different from `current`.
    pub fn fresh_username(&mut self, current: &str) -> String {
        let provider = &mut self.provider;
        redraw_until_different(current, || provider.next_username())
    }

    /// Draw a product name for an update, different from `current`.
    pub fn fresh_product_name(&mut self, current: &str) -> String {
        let provider = &mut self.provider;
        redraw_until_different(current, || provider.next_person_name())
    }
}

fn redraw_until_different(current: &str, mut draw: impl FnMut() -> String) -> String {
    let mut value = draw();
    for _ in 0..MAX_REDRAWS {
        if value != current {
            break;
        }
        value = draw();
    }
    if value == current {
        // An update must change the row.
        value.push_str("_1");
    }
    value
}
