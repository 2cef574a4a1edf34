//! Ranking metrics over labelled prediction records

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::predict::PredictionRecord;

/// Evaluation of one method on one split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMetrics {
    /// Probability that a random positive outranks a random negative
    pub auc: f64,
    pub average_precision: f64,

    /// precision@k keyed by the requested k
    pub precision_at: BTreeMap<usize, f64>,

    /// Mean score, the cut-off for the thresholded metrics
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Score descending, ties by ascending pair ids
pub fn rank_order(a: &PredictionRecord, b: &PredictionRecord) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.target.cmp(&b.target))
}

/// Mann-Whitney AUC with tied scores counting one half
pub fn auc(records: &[PredictionRecord]) -> f64 {
    let mut sorted: Vec<&PredictionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.score.total_cmp(&b.score));

    let positives = records.iter().filter(|r| r.label).count();
    let negatives = records.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    // Sum of average ranks (1-based) over positives
    let mut rank_sum = 0.0;
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start;
        while end + 1 < sorted.len() && sorted[end + 1].score == sorted[start].score {
            end += 1;
        }
        let average_rank = (start + end) as f64 / 2.0 + 1.0;
        let tied_positives = sorted[start..=end].iter().filter(|r| r.label).count();
        rank_sum += average_rank * tied_positives as f64;
        start = end + 1;
    }

    let p = positives as f64;
    (rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64)
}

/// Share of positives among the top `k` of `ranked`, `k` clamped to its length
pub fn precision_at_k(ranked: &[PredictionRecord], k: usize) -> f64 {
    let k = k.min(ranked.len());
    if k == 0 {
        return 0.0;
    }
    ranked[..k].iter().filter(|r| r.label).count() as f64 / k as f64
}

/// Step-wise average precision with tied scores forming one threshold
pub fn average_precision(ranked: &[PredictionRecord]) -> f64 {
    let positives = ranked.iter().filter(|r| r.label).count();
    if positives == 0 {
        return 0.0;
    }

    let mut ap = 0.0;
    let mut true_positives = 0usize;
    let mut previous_recall = 0.0;
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start;
        while end + 1 < ranked.len() && ranked[end + 1].score == ranked[start].score {
            end += 1;
        }
        true_positives += ranked[start..=end].iter().filter(|r| r.label).count();

        let precision = true_positives as f64 / (end + 1) as f64;
        let recall = true_positives as f64 / positives as f64;
        ap += (recall - previous_recall) * precision;
        previous_recall = recall;
        start = end + 1;
    }
    ap
}

/// All metrics for `records`, which must hold at least one record
pub fn evaluate_records(records: &[PredictionRecord], precision_at: &[usize]) -> PredictionMetrics {
    let mut ranked = records.to_vec();
    ranked.sort_by(rank_order);

    let threshold = records.iter().map(|r| r.score).mean();
    let predicted = records.iter().filter(|r| r.score >= threshold).count();
    let actual = records.iter().filter(|r| r.label).count();
    let hits = records
        .iter()
        .filter(|r| r.label && r.score >= threshold)
        .count();

    let precision = if predicted == 0 { 0.0 } else { hits as f64 / predicted as f64 };
    let recall = if actual == 0 { 0.0 } else { hits as f64 / actual as f64 };
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    PredictionMetrics {
        auc: auc(records),
        average_precision: average_precision(&ranked),
        precision_at: precision_at
            .iter()
            .map(|&k| (k, precision_at_k(&ranked, k)))
            .collect(),
        threshold,
        precision,
        recall,
        f1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, score: f64, label: bool) -> PredictionRecord {
        PredictionRecord {
            source: source.to_string(),
            target: "Z".to_string(),
            score,
            label,
        }
    }

    #[test]
    fn perfect_ranking() {
        let records = vec![
            record("A", 3.0, true),
            record("B", 2.0, true),
            record("C", 1.0, false),
            record("D", 0.0, false),
        ];
        let metrics = evaluate_records(&records, &[1, 10]);
        assert_eq!(metrics.auc, 1.0);
        assert_eq!(metrics.average_precision, 1.0);
        assert_eq!(metrics.precision_at[&1], 1.0);
        // k = 10 is clamped to the four records
        assert_eq!(metrics.precision_at[&10], 0.5);
        assert_eq!(metrics.threshold, 1.5);
        assert_eq!((metrics.precision, metrics.recall, metrics.f1), (1.0, 1.0, 1.0));
    }

    #[test]
    fn all_ties_give_half_auc() {
        let records = vec![
            record("A", 1.0, true),
            record("B", 1.0, false),
            record("C", 1.0, true),
            record("D", 1.0, false),
        ];
        assert_eq!(auc(&records), 0.5);
        let mut ranked = records.clone();
        ranked.sort_by(rank_order);
        assert_eq!(average_precision(&ranked), 0.5);
    }

    #[test]
    fn inverted_ranking() {
        let records = vec![record("A", 0.0, true), record("B", 1.0, false)];
        assert_eq!(auc(&records), 0.0);
    }

    #[test]
    fn ranking_ties_break_by_pair_ids() {
        let mut records = vec![record("B", 1.0, false), record("A", 1.0, true)];
        records.sort_by(rank_order);
        assert_eq!(records[0].source, "A");
        assert_eq!(precision_at_k(&records, 1), 1.0);
    }
}
