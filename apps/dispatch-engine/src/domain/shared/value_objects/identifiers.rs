//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up IDs from different contexts.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(MasterOrderId, "Unique identifier for a master order.");
define_id!(ChildOrderId, "Unique identifier for a child order.");
define_id!(AccountId, "Identifier of a linked trading account.");
define_id!(UserId, "Identifier of the user owning one or more accounts.");
define_id!(FillId, "Unique identifier for an executed fill.");
define_id!(
    ConnectionId,
    "Identifier of one live real-time connection (socket) of an account."
);
define_id!(
    ClientOrderId,
    "Client-assigned order reference carried to the broker."
);
define_id!(BrokerOrderId, "Broker's reference for a placed child order.");

impl ClientOrderId {
    /// Generate a short client reference of the form `CL-XXXXXX`.
    #[must_use]
    pub fn generate_short() -> Self {
        Self(format!("CL-{}", short_token(6)))
    }
}

impl BrokerOrderId {
    /// Generate a paper broker reference of the form `PB-XXXXXXXX`.
    #[must_use]
    pub fn generate_paper() -> Self {
        Self(format!("PB-{}", short_token(8)))
    }
}

fn short_token(len: usize) -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(len)
        .collect::<String>()
        .to_uppercase()
}
