//! JobRec Classifiers
//!
//! Job-category classification for a candidate profile and a job
//! description.
//!
//! The pipeline is: join the two texts around the `[SEP]` token, run a
//! fine-tuned ALBERT sequence classifier on Candle, softmax the logits and
//! rank the fixed category list by probability.
//!
//! Models load once, synchronously, from the Hugging Face Hub or a local
//! directory. The loaded classifier is immutable and shared between
//! requests.

pub mod albert;
pub mod albert_classifier;
pub mod categories;
pub mod classifier;
pub mod model_config;
pub mod model_loader;
pub mod ranking;
pub mod recommender;

pub use albert::{AlbertConfig, AlbertForSequenceClassification, AlbertModel, HiddenAct};
pub use albert_classifier::AlbertSequenceClassifier;
pub use categories::{combine_text, default_categories, JOB_CATEGORIES, SEQUENCE_SEPARATOR};
pub use classifier::SequenceClassifier;
pub use model_config::{DeviceType, ModelConfig, ModelSource};
pub use model_loader::load_classifier;
pub use ranking::{rank, softmax};
pub use recommender::JobRecommender;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::categories::JOB_CATEGORIES;
    pub use crate::classifier::SequenceClassifier;
    pub use crate::model_config::{DeviceType, ModelConfig, ModelSource};
    pub use crate::recommender::JobRecommender;
}
