//! Movement groups and their completion barrier.
//!
//! Every movement belongs to a group: one shared group for a formation, or a
//! singleton per unit in individual mode. A group's members may only translate
//! once every member has finished turning onto its heading.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a movement group, unique within one [`UnitMover`](super::UnitMover).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(u64);

impl GroupId {
    /// Creates a group id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group-{}", self.0)
    }
}

/// Counts the members of a group that have not finished turning.
///
/// Members report completion once. A member leaving the group (arrival,
/// re-tasking, removal) is released; if it had not finished turning it stops
/// holding the barrier.
///
/// ```
/// use mday_core::movement::CompletionBarrier;
///
/// let mut barrier = CompletionBarrier::new(2);
/// barrier.complete_one();
/// assert!(!barrier.is_satisfied());
///
/// // The unfinished member is re-tasked elsewhere.
/// let empty = barrier.release(false);
/// assert!(!empty);
/// assert!(barrier.is_satisfied());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionBarrier {
    members: usize,
    outstanding: usize,
}

impl CompletionBarrier {
    /// Creates a barrier for `members` units, none of which has turned yet.
    #[must_use]
    pub const fn new(members: usize) -> Self {
        Self {
            members,
            outstanding: members,
        }
    }

    /// Records that one member finished turning.
    pub fn complete_one(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    /// Removes a member. `turned` says whether it had already reported
    /// completion. Returns `true` when the group has no members left.
    pub fn release(&mut self, turned: bool) -> bool {
        self.members = self.members.saturating_sub(1);
        if !turned {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
        self.members == 0
    }

    /// Whether every remaining member has finished turning.
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        self.outstanding == 0
    }

    /// Members still in the group.
    #[must_use]
    pub const fn members(&self) -> usize {
        self.members
    }

    /// Members still turning.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.outstanding
    }
}
