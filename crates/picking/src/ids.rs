use serde::{Deserialize, Serialize};

use forgewms_core::AggregateId;

macro_rules! picking_id {
    ($(#[$meta:meta])* $t:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(pub AggregateId);

        impl $t {
            pub fn new(id: AggregateId) -> Self {
                Self(id)
            }

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

picking_id!(
    /// Load identifier (a batch of orders planned and picked together).
    LoadId
);

picking_id!(
    /// Customer order identifier.
    OrderId
);

picking_id!(
    /// Order line item identifier.
    LineItemId
);

picking_id!(PickTaskId);
