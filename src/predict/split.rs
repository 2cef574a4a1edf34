//! Held-out edge split and negative sampling

use rand::prelude::*;
use rand::rngs::StdRng;
use rand::seq::index;
use std::collections::HashSet;

use crate::diagnostics::{Diagnostics, Warning};
use crate::graph::DrugGraph;

/// Training graph plus the labelled candidate pairs
#[derive(Debug, Clone)]
pub struct Split {
    /// Undirected graph with the held-out edges removed
    pub training: DrugGraph,

    /// Held-out edges as `(smaller, larger)` node indices
    pub positives: Vec<(usize, usize)>,

    /// Pairs adjacent in neither direction in the original graph
    pub negatives: Vec<(usize, usize)>,
}

/// Nodes with edges in `original` that have none left in `training`
fn isolated_nodes(original: &DrugGraph, training: &DrugGraph) -> usize {
    (0..original.node_count())
        .filter(|&v| original.degree(v) > 0 && training.degree(v) == 0)
        .count()
}

/// Hold out `floor(|E| * test_fraction)` edges of the undirected view of
/// `graph` and draw as many negative pairs, all from `rng`.
///
/// Returns `None` with an `InsufficientEdges` warning when no edge can be
/// held out.
pub fn holdout(
    graph: &DrugGraph,
    test_fraction: f64,
    max_attempts: usize,
    rng: &mut StdRng,
    diagnostics: &mut Diagnostics,
) -> Option<Split> {
    let view = graph.undirected_view();
    let edge_count = view.edge_count();
    let held = ((edge_count as f64 * test_fraction).floor() as usize).min(edge_count);

    if held == 0 {
        diagnostics.warn(Warning::InsufficientEdges { edge_count, test_fraction });
        return None;
    }

    let mut attempts = 0;
    let (training, removed) = loop {
        attempts += 1;
        let mut removed = index::sample(rng, edge_count, held).into_vec();
        removed.sort_unstable();
        let training = view.without_edges(&removed);

        let isolated = isolated_nodes(&view, &training);
        if isolated == 0 {
            break (training, removed);
        }
        if attempts >= max_attempts.max(1) {
            diagnostics.warn(Warning::SplitResampled { attempts, isolated_nodes: isolated });
            break (training, removed);
        }
        log::debug!("Split attempt {} isolated {} nodes, resampling", attempts, isolated);
    };

    let positives: Vec<(usize, usize)> = removed
        .iter()
        .map(|&pos| view.edges()[pos].canonical())
        .collect();
    let negatives = sample_non_edges(&view, positives.len(), rng, diagnostics);

    log::info!(
        "Held out {} of {} edges with {} negative pairs",
        positives.len(),
        edge_count,
        negatives.len()
    );

    Some(Split {
        training,
        positives,
        negatives,
    })
}

/// Draw `count` distinct non-adjacent pairs of `view` uniformly
pub fn sample_non_edges(
    view: &DrugGraph,
    count: usize,
    rng: &mut StdRng,
    diagnostics: &mut Diagnostics,
) -> Vec<(usize, usize)> {
    let n = view.node_count();
    let all_pairs = n * n.saturating_sub(1) / 2;
    let available = all_pairs - view.edge_count();

    if available < count {
        diagnostics.warn(Warning::InsufficientNegatives { requested: count, available });
    }

    // Dense graphs: enumerate; sparse graphs: rejection sampling
    if available <= count.saturating_mul(4) {
        let candidates: Vec<(usize, usize)> = (0..n)
            .flat_map(|u| (u + 1..n).map(move |v| (u, v)))
            .filter(|&(u, v)| !view.are_adjacent(u, v))
            .collect();
        let take = count.min(candidates.len());
        let mut picked = index::sample(rng, candidates.len(), take).into_vec();
        picked.sort_unstable();
        return picked.into_iter().map(|i| candidates[i]).collect();
    }

    let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(count);
    let mut negatives = Vec::with_capacity(count);
    while negatives.len() < count {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u == v || view.are_adjacent(u, v) {
            continue;
        }
        let pair = if u < v { (u, v) } else { (v, u) };
        if seen.insert(pair) {
            negatives.push(pair);
        }
    }
    negatives
}
