//! Ordered acquisition of region lock sets.
//!
//! Every region has its own mutex, and the region's owner lives inside it, so
//! ownership cannot be read or written without holding the lock. Threads
//! that need several regions always lock them in ascending index order and
//! release in descending order. Because every thread follows the same total
//! order no cycle of waiters can form.

use parking_lot::{Mutex, MutexGuard};

use crate::board::{Owner, RegionGraph};

/// A deduplicated, ascending set of region indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockSet {
    indices: Vec<usize>,
}

impl LockSet {
    /// Builds a set from arbitrary indices, dropping duplicates.
    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        LockSet { indices }
    }

    /// The target region plus all of its neighbors.
    ///
    /// A region that lists itself, or lists a neighbor twice, yields each
    /// index once; locking it twice would deadlock the caller on itself.
    pub fn for_move(graph: &RegionGraph, target: usize) -> Self {
        let neighbors = graph.neighbors(target);
        let mut indices = Vec::with_capacity(1 + neighbors.len());
        indices.push(target);
        indices.extend_from_slice(neighbors);
        LockSet::from_indices(indices)
    }

    pub fn single(index: usize) -> Self {
        LockSet {
            indices: vec![index],
        }
    }

    /// Every region of a board with `len` regions.
    pub fn all(len: usize) -> Self {
        LockSet {
            indices: (0..len).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// One mutex per region, each guarding that region's owner.
#[derive(Debug)]
pub struct RegionLocks {
    cells: Vec<Mutex<Owner>>,
}

impl RegionLocks {
    /// Creates one lock per region, initialised with the graph's owners.
    pub fn from_graph(graph: &RegionGraph) -> Self {
        RegionLocks {
            cells: graph
                .regions()
                .iter()
                .map(|r| Mutex::new(r.owner))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Locks every region in `set`, lowest index first.
    ///
    /// Blocks until all locks are held; the caller never sees a partially
    /// acquired set. Panics if an index is outside the board.
    pub fn acquire(&self, set: &LockSet) -> LockSetGuard<'_> {
        let mut held = Vec::with_capacity(set.len());
        for &index in set.indices() {
            held.push((index, self.cells[index].lock()));
        }
        LockSetGuard { held }
    }

    /// Locks the whole board in ascending order.
    pub fn acquire_all(&self) -> LockSetGuard<'_> {
        self.acquire(&LockSet::all(self.cells.len()))
    }

    /// Locks a single region.
    pub fn acquire_one(&self, index: usize) -> LockSetGuard<'_> {
        self.acquire(&LockSet::single(index))
    }
}

/// Holds a set of region locks; dropping it releases them highest index first.
pub struct LockSetGuard<'a> {
    held: Vec<(usize, MutexGuard<'a, Owner>)>,
}

impl<'a> LockSetGuard<'a> {
    fn position(&self, index: usize) -> Option<usize> {
        self.held.binary_search_by_key(&index, |(i, _)| *i).ok()
    }

    /// Owner of a held region, or None if the region is not in this set.
    pub fn owner(&self, index: usize) -> Option<Owner> {
        self.position(index).map(|p| *self.held[p].1)
    }

    /// Replaces the owner of a held region and returns the previous owner.
    /// Returns None, changing nothing, if the region is not in this set.
    pub fn set_owner(&mut self, index: usize, owner: Owner) -> Option<Owner> {
        let p = self.position(index)?;
        Some(std::mem::replace(&mut *self.held[p].1, owner))
    }

    /// Held (index, owner) pairs, ascending.
    pub fn owners(&self) -> impl Iterator<Item = (usize, Owner)> + '_ {
        self.held.iter().map(|(i, g)| (*i, **g))
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl Drop for LockSetGuard<'_> {
    fn drop(&mut self) {
        while let Some((_, guard)) = self.held.pop() {
            drop(guard);
        }
    }
}
