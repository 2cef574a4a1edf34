//! Compressed sparse row adjacency

use serde::{Deserialize, Serialize};

/// Compressed sparse representation of adjacency lists.
///
/// `offsets[i]..offsets[i + 1]` is the range of `targets` holding the
/// neighbours of node `i`. Each range is sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedAdjacency {
    /// Offset array: index where each node's neighbours begin
    offsets: Vec<u32>,

    /// Concatenated, sorted neighbour lists
    targets: Vec<u32>,
}

impl CompressedAdjacency {
    /// Build from per-node neighbour lists, sorting and deduplicating each
    pub fn from_lists(mut lists: Vec<Vec<u32>>) -> Self {
        let edge_count: usize = lists.iter().map(|list| list.len()).sum();

        let mut offsets = Vec::with_capacity(lists.len() + 1);
        let mut targets = Vec::with_capacity(edge_count);
        offsets.push(0);

        for list in &mut lists {
            // Sorted for binary search in has_edge
            list.sort_unstable();
            list.dedup();
            targets.extend_from_slice(list);
            offsets.push(targets.len() as u32);
        }

        Self { offsets, targets }
    }

    /// Number of nodes covered
    pub fn node_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Neighbours of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.targets[start..end]
    }

    /// Check if `dst` is listed as a neighbour of `src`
    pub fn has_edge(&self, src: usize, dst: u32) -> bool {
        self.neighbors(src).binary_search(&dst).is_ok()
    }

    pub fn degree(&self, node: usize) -> usize {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        end - start
    }
}
