//! Item identifiers
//!
//! The demo dataset only guarantees records with ids `1..=30`. Anything
//! above that was minted client-side (or by a create the server never
//! persisted) and must not be sent to the remote mutation endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Largest identifier that exists upstream
pub const REMOTE_ID_MAX: u64 = 30;

/// Identifier of an item, tagged by where it can be mutated
///
/// Serializes as a bare number; deserialization classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum ItemId {
    /// Exists in the upstream dataset; mutations go over the wire
    Remote(u64),
    /// Exists only in local state; mutations never leave the process
    Local(u64),
}

impl ItemId {
    pub fn from_raw(raw: u64) -> Self {
        if raw > REMOTE_ID_MAX {
            ItemId::Local(raw)
        } else {
            ItemId::Remote(raw)
        }
    }

    pub fn raw(self) -> u64 {
        match self {
            ItemId::Remote(raw) | ItemId::Local(raw) => raw,
        }
    }

    pub fn is_local(self) -> bool {
        matches!(self, ItemId::Local(_))
    }

    /// The raw id if this item may be mutated remotely
    pub fn remote(self) -> Option<u64> {
        match self {
            ItemId::Remote(raw) => Some(raw),
            ItemId::Local(_) => None,
        }
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        ItemId::from_raw(raw)
    }
}

impl From<ItemId> for u64 {
    fn from(id: ItemId) -> Self {
        id.raw()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// Mints local identifiers from the millisecond clock
///
/// Strictly increasing per clock, so two adds in the same millisecond
/// still get distinct ids.
#[derive(Debug, Default)]
pub struct LocalIdClock {
    last: AtomicU64,
}

impl LocalIdClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self) -> ItemId {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last.saturating_add(1)).max(REMOTE_ID_MAX + 1);
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return ItemId::Local(candidate),
                Err(actual) => last = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(ItemId::from_raw(1), ItemId::Remote(1));
        assert_eq!(ItemId::from_raw(30), ItemId::Remote(30));
        assert_eq!(ItemId::from_raw(31), ItemId::Local(31));
        assert_eq!(ItemId::from_raw(151), ItemId::Local(151));
    }

    #[test]
    fn test_serde_is_a_bare_number() {
        let id: ItemId = serde_json::from_str("7").unwrap();
        assert_eq!(id, ItemId::Remote(7));
        assert_eq!(serde_json::to_string(&ItemId::Local(1700000000000)).unwrap(), "1700000000000");
    }

    #[test]
    fn test_clock_is_strictly_increasing_and_local() {
        let clock = LocalIdClock::new();
        let a = clock.mint();
        let b = clock.mint();
        assert!(a.is_local());
        assert!(b.raw() > a.raw());
    }

    proptest! {
        #[test]
        fn prop_classification_matches_threshold(raw in any::<u64>()) {
            let id = ItemId::from_raw(raw);
            prop_assert_eq!(id.raw(), raw);
            prop_assert_eq!(id.is_local(), raw > REMOTE_ID_MAX);
            prop_assert_eq!(id.remote().is_some(), raw <= REMOTE_ID_MAX);
        }
    }
}
