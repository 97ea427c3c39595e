//! Probability normalization and ranking

use candle_core::{Device, Tensor, D};
use jobrec_core::{Error, Result, Recommendations};
use std::cmp::Ordering;

/// Softmax over a logit vector: `p_i = exp(x_i) / sum_j exp(x_j)`.
pub fn softmax(logits: &[f32]) -> Result<Vec<f32>> {
    if logits.is_empty() {
        return Ok(Vec::new());
    }

    let tensor = Tensor::new(logits, &Device::Cpu)
        .map_err(|e| Error::classifier(format!("Failed to create logit tensor: {}", e)))?;

    candle_nn::ops::softmax(&tensor, D::Minus1)
        .map_err(|e| Error::classifier(format!("Softmax failed: {}", e)))?
        .to_vec1()
        .map_err(|e| Error::classifier(format!("Failed to convert to vec: {}", e)))
}

/// Pair each probability with its category and sort descending.
///
/// The sort is stable: equal probabilities keep category order. NaN
/// compares equal to everything.
pub fn rank(categories: &[String], probabilities: &[f32]) -> Result<Recommendations> {
    if categories.len() != probabilities.len() {
        return Err(Error::LabelMismatch {
            expected: categories.len(),
            actual: probabilities.len(),
        });
    }

    let mut entries: Vec<(String, f32)> = categories
        .iter()
        .cloned()
        .zip(probabilities.iter().copied())
        .collect();

    entries.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    Ok(Recommendations::new(entries))
}
