//! Ring topology over a fixed membership.

use crate::{MembershipError, ProcessId};
use indexmap::IndexSet;

/// One message hop between ring neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub from: ProcessId,
    pub to: ProcessId,
}

/// An ordered, cyclic membership list.
///
/// The order is the one supplied by the caller (or ascending, when built with
/// [`RingTopology::sorted`]) and is never changed afterwards: removing a
/// member closes the gap and the successor links recompute around it, but the
/// survivors keep their relative order.
#[derive(Debug, Clone, Default)]
pub struct RingTopology {
    members: IndexSet<ProcessId>,
}

// IndexSet equality ignores order; ring equality does not.
impl PartialEq for RingTopology {
    fn eq(&self, other: &Self) -> bool {
        self.members.iter().eq(other.members.iter())
    }
}

impl Eq for RingTopology {}

impl RingTopology {
    /// Create a topology preserving the caller's order.
    ///
    /// An empty input is accepted; operations that need members will report
    /// [`MembershipError::EmptyMembership`].
    pub fn new(ids: impl IntoIterator<Item = ProcessId>) -> Result<Self, MembershipError> {
        let mut members = IndexSet::new();
        for id in ids {
            if !members.insert(id) {
                return Err(MembershipError::DuplicateProcess(id));
            }
        }
        Ok(Self { members })
    }

    /// Create a topology whose ring order is ascending by ID.
    pub fn sorted(ids: impl IntoIterator<Item = ProcessId>) -> Result<Self, MembershipError> {
        let mut topology = Self::new(ids)?;
        topology.members.sort();
        Ok(topology)
    }

    /// Number of live members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the topology has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if a process is a member.
    pub fn contains(&self, id: ProcessId) -> bool {
        self.members.contains(&id)
    }

    /// Position of a process in ring order.
    pub fn position(&self, id: ProcessId) -> Option<usize> {
        self.members.get_index_of(&id)
    }

    /// Members in ring order.
    pub fn iter(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.members.iter().copied()
    }

    /// Members in ring order, collected.
    pub fn to_vec(&self) -> Vec<ProcessId> {
        self.iter().collect()
    }

    /// First member in ring order.
    pub fn first(&self) -> Result<ProcessId, MembershipError> {
        self.members
            .first()
            .copied()
            .ok_or(MembershipError::EmptyMembership)
    }

    /// Highest live ID, if any.
    pub fn max(&self) -> Option<ProcessId> {
        self.members.iter().max().copied()
    }

    /// Members whose ID is numerically greater than `id`, in ring order.
    pub fn higher_than(&self, id: ProcessId) -> impl Iterator<Item = ProcessId> + '_ {
        self.iter().filter(move |p| *p > id)
    }

    /// Next member after `id`, wrapping around the end of the ring.
    ///
    /// A single-member ring is its own successor.
    pub fn successor(&self, id: ProcessId) -> Result<ProcessId, MembershipError> {
        let index = self.index_of(id)?;
        Ok(self.members[(index + 1) % self.members.len()])
    }

    /// Member before `id`, wrapping around the start of the ring.
    pub fn predecessor(&self, id: ProcessId) -> Result<ProcessId, MembershipError> {
        let index = self.index_of(id)?;
        let len = self.members.len();
        Ok(self.members[(index + len - 1) % len])
    }

    /// Drop a failed member; successor links close around the gap.
    pub fn remove_and_renumber(&mut self, id: ProcessId) -> Result<(), MembershipError> {
        if self.members.is_empty() {
            return Err(MembershipError::EmptyMembership);
        }
        if !self.members.shift_remove(&id) {
            return Err(MembershipError::UnknownProcess(id));
        }
        Ok(())
    }

    /// Walk the ring once starting at `start`.
    ///
    /// Yields exactly `len()` hops; the last one arrives back at `start`.
    pub fn walk_from(&self, start: ProcessId) -> Result<RingWalk<'_>, MembershipError> {
        let index = self.index_of(start)?;
        Ok(RingWalk {
            topology: self,
            current: index,
            remaining: self.members.len(),
        })
    }

    fn index_of(&self, id: ProcessId) -> Result<usize, MembershipError> {
        if self.members.is_empty() {
            return Err(MembershipError::EmptyMembership);
        }
        self.position(id)
            .ok_or(MembershipError::UnknownProcess(id))
    }
}

/// Iterator over the hops of one full traversal, see [`RingTopology::walk_from`].
#[derive(Debug, Clone)]
pub struct RingWalk<'a> {
    topology: &'a RingTopology,
    current: usize,
    remaining: usize,
}

impl Iterator for RingWalk<'_> {
    type Item = Hop;

    fn next(&mut self) -> Option<Hop> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let members = &self.topology.members;
        let next = (self.current + 1) % members.len();
        let hop = Hop {
            from: members[self.current],
            to: members[next],
        };
        self.current = next;
        Some(hop)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RingWalk<'_> {}
