use serde::{Serialize, Deserialize};
use std::fmt;

/// Opaque identity of one network owned by an `Engine`.
///
/// Handles are minted in increasing order and never reused, so a stale
/// handle can only ever resolve to "gone", never to another network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkHandle(u64);

impl NetworkHandle {
    pub(crate) fn new(id: u64) -> Self {
        NetworkHandle(id)
    }

    /// Raw integer form, for handing across an FFI or scripting boundary.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Rebuilds a handle from its raw form. Whether it names a live network is
    /// checked on every engine call.
    pub fn from_u64(raw: u64) -> Self {
        NetworkHandle(raw)
    }
}

impl fmt::Display for NetworkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net#{}", self.0)
    }
}
