//! ALBERT for sequence classification, implemented on Candle.
//!
//! ALBERT is BERT with two changes that matter here: token embeddings live
//! in a small `embedding_size` space and are projected up to `hidden_size`,
//! and transformer layers are shared. `num_hidden_layers` passes are made
//! through `num_hidden_groups` layer groups, each group holding
//! `inner_group_num` layers.
//!
//! Tensor names follow the Hugging Face checkpoint layout so weights load
//! straight from `model.safetensors` or `pytorch_model.bin`.

use candle_core::{bail, IndexOp, Module, Result, Tensor};
use candle_nn::{embedding, layer_norm, linear, Embedding, LayerNorm, Linear, VarBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Feed-forward activation, as named by `hidden_act` in `config.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HiddenAct {
    /// Exact erf-based GELU
    #[serde(rename = "gelu")]
    Gelu,
    /// Tanh-approximated GELU (ALBERT's default)
    #[default]
    #[serde(
        rename = "gelu_new",
        alias = "gelu_fast",
        alias = "gelu_pytorch_tanh"
    )]
    GeluNew,
    #[serde(rename = "relu")]
    Relu,
    #[serde(rename = "silu", alias = "swish")]
    Silu,
}

impl HiddenAct {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        match self {
            Self::Gelu => xs.gelu_erf(),
            Self::GeluNew => xs.gelu(),
            Self::Relu => xs.relu(),
            Self::Silu => candle_nn::ops::silu(xs),
        }
    }
}

/// Subset of the Hugging Face `AlbertConfig` needed for inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbertConfig {
    pub vocab_size: usize,
    pub embedding_size: usize,
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    #[serde(default = "default_one")]
    pub num_hidden_groups: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    #[serde(default = "default_one")]
    pub inner_group_num: usize,
    #[serde(default)]
    pub hidden_act: HiddenAct,
    #[serde(default = "default_max_position_embeddings")]
    pub max_position_embeddings: usize,
    #[serde(default = "default_type_vocab_size")]
    pub type_vocab_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
    #[serde(default)]
    pub num_labels: Option<usize>,
    #[serde(default)]
    pub id2label: Option<HashMap<String, String>>,
}

fn default_one() -> usize {
    1
}

fn default_max_position_embeddings() -> usize {
    512
}

fn default_type_vocab_size() -> usize {
    2
}

fn default_layer_norm_eps() -> f64 {
    1e-12
}

impl Default for AlbertConfig {
    /// `albert-base-v2` hyper-parameters
    fn default() -> Self {
        Self {
            vocab_size: 30000,
            embedding_size: 128,
            hidden_size: 768,
            num_hidden_layers: 12,
            num_hidden_groups: 1,
            num_attention_heads: 12,
            intermediate_size: 3072,
            inner_group_num: 1,
            hidden_act: HiddenAct::GeluNew,
            max_position_embeddings: default_max_position_embeddings(),
            type_vocab_size: default_type_vocab_size(),
            layer_norm_eps: default_layer_norm_eps(),
            num_labels: None,
            id2label: None,
        }
    }
}

impl AlbertConfig {
    /// Label count the checkpoint declares, if any.
    ///
    /// `id2label` wins over `num_labels`; exported configs usually carry only
    /// the former.
    pub fn declared_num_labels(&self) -> Option<usize> {
        self.id2label
            .as_ref()
            .map(HashMap::len)
            .or(self.num_labels)
    }

    /// Reject shapes the forward pass cannot handle
    pub fn validate(&self) -> Result<()> {
        if self.num_attention_heads == 0 || self.hidden_size % self.num_attention_heads != 0 {
            bail!(
                "hidden_size {} is not a multiple of num_attention_heads {}",
                self.hidden_size,
                self.num_attention_heads
            );
        }
        if self.num_hidden_groups == 0 || self.num_hidden_groups > self.num_hidden_layers {
            bail!(
                "num_hidden_groups must be in 1..={}, got {}",
                self.num_hidden_layers,
                self.num_hidden_groups
            );
        }
        if self.inner_group_num == 0 {
            bail!("inner_group_num must be at least 1");
        }
        Ok(())
    }

    fn head_dim(&self) -> usize {
        self.hidden_size / self.num_attention_heads
    }
}

struct AlbertEmbeddings {
    word_embeddings: Embedding,
    position_embeddings: Embedding,
    token_type_embeddings: Embedding,
    layer_norm: LayerNorm,
}

impl AlbertEmbeddings {
    fn load(vb: VarBuilder, cfg: &AlbertConfig) -> Result<Self> {
        Ok(Self {
            word_embeddings: embedding(
                cfg.vocab_size,
                cfg.embedding_size,
                vb.pp("word_embeddings"),
            )?,
            position_embeddings: embedding(
                cfg.max_position_embeddings,
                cfg.embedding_size,
                vb.pp("position_embeddings"),
            )?,
            token_type_embeddings: embedding(
                cfg.type_vocab_size,
                cfg.embedding_size,
                vb.pp("token_type_embeddings"),
            )?,
            layer_norm: layer_norm(cfg.embedding_size, cfg.layer_norm_eps, vb.pp("LayerNorm"))?,
        })
    }

    fn forward(&self, input_ids: &Tensor, token_type_ids: &Tensor) -> Result<Tensor> {
        let (_batch, seq_len) = input_ids.dims2()?;
        let position_ids = Tensor::arange(0u32, seq_len as u32, input_ids.device())?;

        let words = self.word_embeddings.forward(input_ids)?;
        let types = self.token_type_embeddings.forward(token_type_ids)?;
        let positions = self.position_embeddings.forward(&position_ids)?;

        let embeddings = (words + types)?.broadcast_add(&positions)?;
        self.layer_norm.forward(&embeddings)
    }
}

struct AlbertAttention {
    query: Linear,
    key: Linear,
    value: Linear,
    dense: Linear,
    layer_norm: LayerNorm,
    num_heads: usize,
    head_dim: usize,
}

impl AlbertAttention {
    fn load(vb: VarBuilder, cfg: &AlbertConfig) -> Result<Self> {
        let hidden = cfg.hidden_size;
        Ok(Self {
            query: linear(hidden, hidden, vb.pp("query"))?,
            key: linear(hidden, hidden, vb.pp("key"))?,
            value: linear(hidden, hidden, vb.pp("value"))?,
            dense: linear(hidden, hidden, vb.pp("dense"))?,
            layer_norm: layer_norm(hidden, cfg.layer_norm_eps, vb.pp("LayerNorm"))?,
            num_heads: cfg.num_attention_heads,
            head_dim: cfg.head_dim(),
        })
    }

    /// (batch, seq, hidden) -> (batch, heads, seq, head_dim)
    fn split_heads(&self, xs: &Tensor) -> Result<Tensor> {
        let (batch, seq_len, _) = xs.dims3()?;
        xs.reshape((batch, seq_len, self.num_heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(&self, hidden: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let (batch, seq_len, _) = hidden.dims3()?;

        let query = self.split_heads(&self.query.forward(hidden)?)?;
        let key = self.split_heads(&self.key.forward(hidden)?)?;
        let value = self.split_heads(&self.value.forward(hidden)?)?;

        let scale = 1.0 / (self.head_dim as f64).sqrt();
        let scores = (query.matmul(&key.t()?.contiguous()?)? * scale)?;
        let scores = scores.broadcast_add(mask)?;
        let probs = candle_nn::ops::softmax_last_dim(&scores)?;

        let context = probs
            .matmul(&value)?
            .transpose(1, 2)?
            .reshape((batch, seq_len, self.num_heads * self.head_dim))?;

        let projected = self.dense.forward(&context)?;
        self.layer_norm.forward(&(hidden + projected)?)
    }
}

struct AlbertLayer {
    attention: AlbertAttention,
    ffn: Linear,
    ffn_output: Linear,
    full_layer_layer_norm: LayerNorm,
    activation: HiddenAct,
}

impl AlbertLayer {
    fn load(vb: VarBuilder, cfg: &AlbertConfig) -> Result<Self> {
        Ok(Self {
            attention: AlbertAttention::load(vb.pp("attention"), cfg)?,
            ffn: linear(cfg.hidden_size, cfg.intermediate_size, vb.pp("ffn"))?,
            ffn_output: linear(cfg.intermediate_size, cfg.hidden_size, vb.pp("ffn_output"))?,
            full_layer_layer_norm: layer_norm(
                cfg.hidden_size,
                cfg.layer_norm_eps,
                vb.pp("full_layer_layer_norm"),
            )?,
            activation: cfg.hidden_act,
        })
    }

    fn forward(&self, hidden: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let attention_output = self.attention.forward(hidden, mask)?;
        let ffn = self
            .activation
            .forward(&self.ffn.forward(&attention_output)?)?;
        let ffn = self.ffn_output.forward(&ffn)?;
        self.full_layer_layer_norm
            .forward(&(ffn + &attention_output)?)
    }
}

struct AlbertLayerGroup {
    layers: Vec<AlbertLayer>,
}

impl AlbertLayerGroup {
    fn load(vb: VarBuilder, cfg: &AlbertConfig) -> Result<Self> {
        let vb = vb.pp("albert_layers");
        let layers = (0..cfg.inner_group_num)
            .map(|idx| AlbertLayer::load(vb.pp(idx), cfg))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { layers })
    }

    fn forward(&self, hidden: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let mut hidden = hidden.clone();
        for layer in &self.layers {
            hidden = layer.forward(&hidden, mask)?;
        }
        Ok(hidden)
    }
}

struct AlbertTransformer {
    embedding_hidden_mapping_in: Linear,
    groups: Vec<AlbertLayerGroup>,
    num_hidden_layers: usize,
}

impl AlbertTransformer {
    fn load(vb: VarBuilder, cfg: &AlbertConfig) -> Result<Self> {
        let groups_vb = vb.pp("albert_layer_groups");
        let groups = (0..cfg.num_hidden_groups)
            .map(|idx| AlbertLayerGroup::load(groups_vb.pp(idx), cfg))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            embedding_hidden_mapping_in: linear(
                cfg.embedding_size,
                cfg.hidden_size,
                vb.pp("embedding_hidden_mapping_in"),
            )?,
            groups,
            num_hidden_layers: cfg.num_hidden_layers,
        })
    }

    fn forward(&self, embeddings: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let mut hidden = self.embedding_hidden_mapping_in.forward(embeddings)?;
        // layer * groups / layers < groups for every layer < layers
        for layer in 0..self.num_hidden_layers {
            let group = layer * self.groups.len() / self.num_hidden_layers;
            hidden = self.groups[group].forward(&hidden, mask)?;
        }
        Ok(hidden)
    }
}

/// ALBERT encoder with pooler
pub struct AlbertModel {
    embeddings: AlbertEmbeddings,
    encoder: AlbertTransformer,
    pooler: Linear,
}

impl AlbertModel {
    pub fn load(vb: VarBuilder, cfg: &AlbertConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            embeddings: AlbertEmbeddings::load(vb.pp("embeddings"), cfg)?,
            encoder: AlbertTransformer::load(vb.pp("encoder"), cfg)?,
            pooler: linear(cfg.hidden_size, cfg.hidden_size, vb.pp("pooler"))?,
        })
    }

    /// Pooled `[CLS]` representation, shape (batch, hidden_size).
    ///
    /// All inputs are u32 tensors of shape (batch, seq_len); `attention_mask`
    /// is 1 for real tokens and 0 for padding.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        // 1 -> 0.0, 0 -> -10000.0, broadcast over heads and query positions
        let mask = attention_mask
            .to_dtype(candle_core::DType::F32)?
            .affine(10000.0, -10000.0)?
            .unsqueeze(1)?
            .unsqueeze(1)?;

        let embeddings = self.embeddings.forward(input_ids, token_type_ids)?;
        let hidden = self.encoder.forward(&embeddings, &mask)?;
        let first_token = hidden.i((.., 0))?.contiguous()?;
        self.pooler.forward(&first_token)?.tanh()
    }
}

/// ALBERT with a linear classification head
pub struct AlbertForSequenceClassification {
    albert: AlbertModel,
    classifier: Linear,
    num_labels: usize,
}

impl AlbertForSequenceClassification {
    /// Load from a checkpoint rooted at `vb`.
    ///
    /// Fails if the stored `classifier.weight` does not have `num_labels` rows.
    pub fn load(vb: VarBuilder, cfg: &AlbertConfig, num_labels: usize) -> Result<Self> {
        Ok(Self {
            albert: AlbertModel::load(vb.pp("albert"), cfg)?,
            classifier: linear(cfg.hidden_size, num_labels, vb.pp("classifier"))?,
            num_labels,
        })
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Logits of shape (batch, num_labels)
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let pooled = self
            .albert
            .forward(input_ids, token_type_ids, attention_mask)?;
        self.classifier.forward(&pooled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    fn tiny_config() -> AlbertConfig {
        AlbertConfig {
            vocab_size: 32,
            embedding_size: 8,
            hidden_size: 16,
            num_hidden_layers: 4,
            num_hidden_groups: 2,
            num_attention_heads: 4,
            intermediate_size: 32,
            inner_group_num: 1,
            max_position_embeddings: 16,
            ..Default::default()
        }
    }

    fn tiny_model(num_labels: usize) -> AlbertForSequenceClassification {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        AlbertForSequenceClassification::load(vb, &tiny_config(), num_labels).unwrap()
    }

    fn row(values: &[u32]) -> Tensor {
        Tensor::new(values, &Device::Cpu).unwrap().unsqueeze(0).unwrap()
    }

    #[test]
    fn test_forward_shape() {
        let model = tiny_model(14);
        let ids = row(&[1, 5, 6, 2, 7, 2]);
        let types = ids.zeros_like().unwrap();
        let mask = ids.ones_like().unwrap();

        let logits = model.forward(&ids, &types, &mask).unwrap();
        assert_eq!(logits.dims(), &[1, 14]);
        assert_eq!(model.num_labels(), 14);
    }

    #[test]
    fn test_forward_is_deterministic() {
        let model = tiny_model(3);
        let ids = row(&[1, 9, 10, 2]);
        let types = ids.zeros_like().unwrap();
        let mask = ids.ones_like().unwrap();

        let run = || -> Vec<f32> {
            model
                .forward(&ids, &types, &mask)
                .unwrap()
                .flatten_all()
                .unwrap()
                .to_vec1()
                .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_padding_is_masked_out() {
        let model = tiny_model(3);

        let ids = row(&[1, 9, 10, 2]);
        let logits = model
            .forward(&ids, &ids.zeros_like().unwrap(), &ids.ones_like().unwrap())
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();

        let padded = row(&[1, 9, 10, 2, 0, 0]);
        let mask = row(&[1, 1, 1, 1, 0, 0]);
        let padded_logits = model
            .forward(&padded, &padded.zeros_like().unwrap(), &mask)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();

        for (a, b) in logits.iter().zip(&padded_logits) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_parse_hf_config() {
        let json = r#"{
            "architectures": ["AlbertForSequenceClassification"],
            "vocab_size": 30000,
            "embedding_size": 128,
            "hidden_size": 768,
            "num_hidden_layers": 12,
            "num_attention_heads": 12,
            "intermediate_size": 3072,
            "hidden_act": "gelu_new",
            "id2label": {"0": "LABEL_0", "1": "LABEL_1", "2": "LABEL_2"},
            "layer_norm_eps": 1e-12
        }"#;

        let cfg: AlbertConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.hidden_act, HiddenAct::GeluNew);
        assert_eq!(cfg.num_hidden_groups, 1);
        assert_eq!(cfg.max_position_embeddings, 512);
        assert_eq!(cfg.declared_num_labels(), Some(3));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_declared_labels_fallback() {
        let mut cfg = tiny_config();
        assert_eq!(cfg.declared_num_labels(), None);
        cfg.num_labels = Some(14);
        assert_eq!(cfg.declared_num_labels(), Some(14));
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let mut cfg = tiny_config();
        cfg.num_attention_heads = 5;
        assert!(cfg.validate().is_err());

        let mut cfg = tiny_config();
        cfg.num_hidden_groups = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_activation_aliases() {
        let act: HiddenAct = serde_json::from_str(r#""gelu_pytorch_tanh""#).unwrap();
        assert_eq!(act, HiddenAct::GeluNew);
        let act: HiddenAct = serde_json::from_str(r#""swish""#).unwrap();
        assert_eq!(act, HiddenAct::Silu);
        let act: HiddenAct = serde_json::from_str(r#""gelu""#).unwrap();
        assert_eq!(act, HiddenAct::Gelu);
    }
}
