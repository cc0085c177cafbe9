use serde::{Deserialize, Serialize};

use forgewms_core::AggregateId;

macro_rules! inventory_id {
    ($(#[$meta:meta])* $t:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(pub AggregateId);

        impl $t {
            pub fn new(id: AggregateId) -> Self {
                Self(id)
            }

            /// Fresh random identifier.
            pub fn generate() -> Self {
                Self(AggregateId::new())
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

inventory_id!(
    /// Product (SKU) identifier.
    ProductId
);

inventory_id!(
    /// Stock lot identifier: one physically located, quantified batch.
    LotId
);

inventory_id!(
    /// Storage location identifier (a slot addressed by zone/aisle/rack/level).
    LocationId
);
