//! The IR's unique-id generator — per §9's design note, the one piece of
//! process-wide state the core depends on. It is initialised once by the
//! caller and threaded explicitly as a capability, never hidden behind a
//! global.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier carried by every IR node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl NodeId {
    /// Build a `NodeId` from a raw value, for IR loaded from disk where ids
    /// were already assigned by whatever produced the JSON module.
    pub fn from_raw(raw: u64) -> Self {
        NodeId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A monotonically increasing id generator. One instance per verification
/// run; never reset mid-run, since ids must stay unique across the whole
/// typed IR module.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u64,
}

impl NodeIdGen {
    pub fn new() -> Self {
        NodeIdGen { next: 0 }
    }

    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}
