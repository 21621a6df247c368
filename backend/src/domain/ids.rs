//! Typed identifiers for domain aggregates.
//!
//! Every aggregate gets its own UUID newtype so a review id can never be
//! passed where an order id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID, e.g. one read from the database.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value).map(Self)
            }
        }
    };
}

define_id! {
    /// Stable user identifier.
    UserId
}

define_id! {
    /// Identifier of an offer aggregate.
    OfferId
}

define_id! {
    /// Identifier of a single pricing tier within an offer.
    OfferDetailId
}

define_id! {
    /// Identifier of an order snapshot.
    OrderId
}

define_id! {
    /// Identifier of a review.
    ReviewId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_distinct() {
        assert_ne!(UserId::random(), UserId::random());
    }

    #[test]
    fn parses_canonical_uuid_strings() {
        let id: OfferId = "3fa85f64-5717-4562-b3fc-2c963f66afa6"
            .parse()
            .expect("canonical uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn serialises_transparently() {
        let id = ReviewId::random();
        let value = serde_json::to_value(id).expect("serialise");
        assert_eq!(value, serde_json::json!(id.as_uuid().to_string()));
    }
}
