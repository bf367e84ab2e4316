//! The region graph.
//!
//! The number of regions and their adjacency are fixed once the graph is
//! built; only owners change afterwards. Adjacency is directed exactly as
//! listed in the board file: if region 1 lists 2, region 2 need not list 1.

use super::region::{Owner, PlayerId, Region};

/// An ordered, fixed-size collection of regions indexed from zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionGraph {
    regions: Vec<Region>,
}

impl RegionGraph {
    /// Wraps an already-validated region list.
    pub fn from_regions(regions: Vec<Region>) -> Self {
        RegionGraph { regions }
    }

    /// Builds a graph from adjacency lists, mainly for tests and benches.
    ///
    /// Returns None if any list exceeds the neighbor bound or names a region
    /// outside the graph.
    pub fn from_adjacency(lists: &[&[usize]]) -> Option<Self> {
        let n = lists.len();
        let mut regions = Vec::with_capacity(n);
        for list in lists {
            let mut region = Region::new();
            for &neighbor in *list {
                if neighbor >= n || !region.push_neighbor(neighbor) {
                    return None;
                }
            }
            regions.push(region);
        }
        Some(RegionGraph { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Neighbor indices of a region, in file order.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.regions[index].neighbors()
    }

    pub fn owner(&self, index: usize) -> Owner {
        self.regions[index].owner
    }

    pub fn set_owner(&mut self, index: usize, owner: Owner) {
        self.regions[index].owner = owner;
    }

    /// Number of regions currently owned by `player`.
    pub fn count_owned_by(&self, player: PlayerId) -> usize {
        self.regions
            .iter()
            .filter(|r| r.owner.is_owned_by(player))
            .count()
    }
}
