//! Classifier trait

use jobrec_core::Result;

/// A text classifier producing one raw score per output class.
///
/// Implementations hold immutable weights; `predict_logits` is a pure
/// function of its input and may be called from many threads at once.
/// Inference is CPU-bound and synchronous, so async callers should run it
/// on the blocking pool.
pub trait SequenceClassifier: Send + Sync {
    /// Raw, unnormalized scores for `text`, one per label
    fn predict_logits(&self, text: &str) -> Result<Vec<f32>>;

    /// Number of output classes
    fn num_labels(&self) -> usize;

    /// Model name, used in logs
    fn name(&self) -> &str;
}
