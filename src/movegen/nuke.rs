//! Nuclear target expansion over the air-adjacency graph.

use std::collections::{BTreeSet, HashMap};

use crate::board::{AirAdjacency, NodeId, ProvinceId};

/// Ring expansion of nuclear reach from a launching province.
pub struct NukeRangeExpander<'a> {
    air: &'a [AirAdjacency],
    index: HashMap<ProvinceId, usize>,
}

impl<'a> NukeRangeExpander<'a> {
    pub fn new(air: &'a [AirAdjacency]) -> Self {
        let index = air
            .iter()
            .enumerate()
            .map(|(i, a)| (a.province, i))
            .collect();
        NukeRangeExpander { air, index }
    }

    /// Air nodes targetable from `origin` with the given range.
    ///
    /// Range 0 is unlimited. Ring 1 is the direct air adjacency of the origin;
    /// each further ring adds the unvisited neighbours of the previous ring.
    /// The launching province is never a target.
    pub fn targets(&self, origin: ProvinceId, range: u32) -> BTreeSet<NodeId> {
        if range == 0 {
            return self
                .air
                .iter()
                .filter(|a| a.province != origin)
                .map(|a| a.node)
                .collect();
        }

        let mut visited: BTreeSet<ProvinceId> = BTreeSet::new();
        visited.insert(origin);
        let mut ring = vec![origin];
        let mut rings = 0;
        while rings < range && !ring.is_empty() {
            let mut next = Vec::new();
            for province in &ring {
                for &adj in self.adjacent(*province) {
                    if visited.insert(adj) {
                        next.push(adj);
                    }
                }
            }
            ring = next;
            rings += 1;
        }

        visited.remove(&origin);
        visited
            .iter()
            .filter_map(|p| self.index.get(p).map(|&i| self.air[i].node))
            .collect()
    }

    fn adjacent(&self, province: ProvinceId) -> &[ProvinceId] {
        self.index
            .get(&province)
            .map(|&i| self.air[i].adjacent.as_slice())
            .unwrap_or(&[])
    }
}
