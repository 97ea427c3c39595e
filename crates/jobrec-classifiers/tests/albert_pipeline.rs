//! End-to-end tests of tokenizer + ALBERT + ranking on a tiny random model
//!
//! Weights come from a `VarMap`, the tokenizer from a WordPiece vocab file,
//! so these run offline. Scores are meaningless; only the shape of the
//! output is checked.

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use jobrec_classifiers::{
    AlbertConfig, AlbertForSequenceClassification, AlbertSequenceClassifier, JobRecommender,
    SequenceClassifier, JOB_CATEGORIES,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{AddedToken, Tokenizer};

const VOCAB: &[&str] = &[
    "[PAD]", "[UNK]", "[CLS]", "[SEP]", "5", "years", "python", ",", "ml", "seeking",
    "engineer", "rust", "backend", "team",
];

fn tiny_config() -> AlbertConfig {
    AlbertConfig {
        vocab_size: VOCAB.len(),
        embedding_size: 8,
        hidden_size: 16,
        num_hidden_layers: 2,
        num_attention_heads: 2,
        intermediate_size: 32,
        max_position_embeddings: 16,
        ..Default::default()
    }
}

fn build_tokenizer(dir: &std::path::Path) -> Tokenizer {
    let vocab_path = dir.join("vocab.txt");
    std::fs::write(&vocab_path, VOCAB.join("\n")).unwrap();

    let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
        .unk_token("[UNK]".to_string())
        .build()
        .unwrap();

    let mut tokenizer = Tokenizer::new(wordpiece);
    tokenizer.with_normalizer(Some(BertNormalizer::default()));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
    tokenizer.with_post_processor(Some(BertProcessing::new(
        ("[SEP]".to_string(), 3),
        ("[CLS]".to_string(), 2),
    )));
    tokenizer.add_special_tokens(&[
        AddedToken::from("[CLS]", true),
        AddedToken::from("[SEP]", true),
        AddedToken::from("[PAD]", true),
    ]);
    tokenizer
}

fn tiny_classifier(num_labels: usize, max_length: usize) -> AlbertSequenceClassifier {
    let dir = tempfile::tempdir().unwrap();
    let tokenizer = build_tokenizer(dir.path());

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let model = AlbertForSequenceClassification::load(vb, &tiny_config(), num_labels).unwrap();

    AlbertSequenceClassifier::new("tiny-albert", tokenizer, model, Device::Cpu, max_length)
        .unwrap()
}

#[test]
fn test_logits_have_one_score_per_label() {
    let classifier = tiny_classifier(14, 16);
    let logits = classifier
        .predict_logits("5 years Python, ML [SEP] Seeking ML engineer")
        .unwrap();
    assert_eq!(logits.len(), 14);
    assert!(logits.iter().all(|l| l.is_finite()));
    assert_eq!(classifier.num_labels(), 14);
    assert_eq!(classifier.name(), "tiny-albert");
}

#[test]
fn test_long_input_is_truncated() {
    // Far beyond the 16 position embeddings; fails unless truncated
    let classifier = tiny_classifier(14, 16);
    let long_profile = "rust backend team ".repeat(200);
    let logits = classifier
        .predict_logits(&format!("{} [SEP] engineer", long_profile))
        .unwrap();
    assert_eq!(logits.len(), 14);
}

#[tokio::test]
async fn test_recommender_over_tiny_albert() {
    let classifier = Arc::new(tiny_classifier(JOB_CATEGORIES.len(), 16));
    let recommender = JobRecommender::new(classifier).unwrap();

    let recs = recommender
        .classify("5 years Python, ML", "Seeking ML engineer")
        .await
        .unwrap();

    assert_eq!(recs.len(), 14);
    let labels: HashSet<&str> = recs.labels().collect();
    assert_eq!(labels, JOB_CATEGORIES.iter().copied().collect::<HashSet<_>>());
    assert!((recs.total() - 1.0).abs() < 1e-4);

    let scores: Vec<f32> = recs.iter().map(|(_, s)| s).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let again = recommender
        .classify("5 years Python, ML", "Seeking ML engineer")
        .await
        .unwrap();
    assert_eq!(recs, again);
}

#[tokio::test]
async fn test_empty_strings_still_classify() {
    let classifier = Arc::new(tiny_classifier(JOB_CATEGORIES.len(), 16));
    let recommender = JobRecommender::new(classifier).unwrap();

    let recs = recommender.classify("", "").await.unwrap();
    assert_eq!(recs.len(), 14);
    assert!((recs.total() - 1.0).abs() < 1e-4);
}

#[test]
fn test_wrong_head_width_is_rejected() {
    let classifier = Arc::new(tiny_classifier(3, 16));
    assert!(JobRecommender::new(classifier).is_err());
}

#[test]
fn test_zero_max_length_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let tokenizer = build_tokenizer(dir.path());
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let model = AlbertForSequenceClassification::load(vb, &tiny_config(), 14).unwrap();

    let result = AlbertSequenceClassifier::new("tiny", tokenizer, model, Device::Cpu, 0);
    assert!(result.is_err());
}
