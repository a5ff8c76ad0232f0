//! Marian MT checkpoints from the Hugging Face hub, run with candle

use anyhow::Context;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarBuilder;
use candle_transformers::models::marian::{self, MTModel};
use hf_hub::api::sync::Api;
use rust_tokenizers::tokenizer::{MarianTokenizer, Tokenizer, TruncationStrategy};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::core::backend::{ModelProvider, TranslationBackend};
use crate::core::beam::{beam_search, SpecialTokens};
use crate::core::models::GenerationConfig;

/// Downloads (or reuses the local hub cache) and builds Marian backends
#[derive(Debug, Clone, Default)]
pub struct MarianProvider {
    use_gpu: bool,
}

impl MarianProvider {
    pub fn new(use_gpu: bool) -> Self {
        Self { use_gpu }
    }

    fn device(&self) -> anyhow::Result<Device> {
        if self.use_gpu {
            let device = Device::cuda_if_available(0)?;
            if device.is_cpu() {
                warn!("GPU requested but unavailable, falling back to CPU");
            }
            Ok(device)
        } else {
            Ok(Device::Cpu)
        }
    }
}

impl ModelProvider for MarianProvider {
    fn load(&self, model_id: &str) -> anyhow::Result<Box<dyn TranslationBackend>> {
        let device = self.device()?;
        let api = Api::new().context("initializing Hugging Face hub client")?;
        let repo = api.model(model_id.to_string());

        let fetch = |file: &str| {
            debug!("Fetching {} from {}", file, model_id);
            repo.get(file)
                .with_context(|| format!("fetching {} for {}", file, model_id))
        };

        let config_path = fetch("config.json")?;
        let config: marian::Config = serde_json::from_str(&std::fs::read_to_string(&config_path)?)
            .context("parsing Marian config.json")?;

        let vocab_path = fetch("vocab.json")?;
        let spm_path = fetch("source.spm")?;
        let tokenizer = MarianTokenizer::from_files(path_str(&vocab_path)?, path_str(&spm_path)?, false)
            .map_err(|e| anyhow::anyhow!("loading Marian tokenizer: {}", e))?;

        let vb = match repo.get("model.safetensors") {
            Ok(weights) => {
                let tensors = candle_core::safetensors::load(&weights, &device)?;
                VarBuilder::from_tensors(tensors, DType::F32, &device)
            }
            Err(err) => {
                debug!("No safetensors checkpoint ({}), using pytorch_model.bin", err);
                let weights = fetch("pytorch_model.bin")?;
                VarBuilder::from_pth(&weights, DType::F32, &device)?
            }
        };
        let model = MTModel::new(&config, vb).context("building Marian model from checkpoint")?;

        info!(
            "Marian model {} ready: vocab={}, layers={}+{}",
            model_id, config.vocab_size, config.encoder_layers, config.decoder_layers
        );

        Ok(Box::new(MarianBackend {
            model,
            tokenizer,
            config,
            device,
        }))
    }
}

fn path_str(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .with_context(|| format!("non UTF-8 path: {}", path.display()))
}

/// Encoder-decoder model plus its SentencePiece tokenizer
pub struct MarianBackend {
    model: MTModel,
    tokenizer: MarianTokenizer,
    config: marian::Config,
    device: Device,
}

impl TranslationBackend for MarianBackend {
    fn encode(&self, text: &str) -> anyhow::Result<Vec<u32>> {
        let encoded = self.tokenizer.encode(
            text,
            None,
            self.config.max_position_embeddings,
            &TruncationStrategy::LongestFirst,
            0,
        );

        let mut ids = encoded
            .token_ids
            .iter()
            .map(|&id| u32::try_from(id).context("tokenizer produced a negative id"))
            .collect::<anyhow::Result<Vec<u32>>>()?;
        if ids.last() != Some(&self.config.eos_token_id) {
            ids.push(self.config.eos_token_id);
        }
        debug!("Encoded {} source tokens", ids.len());
        Ok(ids)
    }

    fn generate(&mut self, input: &[u32], generation: &GenerationConfig) -> anyhow::Result<Vec<u32>> {
        self.model.reset_kv_cache();
        let input = Tensor::new(input, &self.device)?.unsqueeze(0)?;
        let encoder_xs = self.model.encoder().forward(&input, 0)?;

        let special = SpecialTokens {
            decoder_start: self.config.decoder_start_token_id,
            eos: self.config.eos_token_id,
            banned: vec![self.config.pad_token_id],
        };

        let model = &mut self.model;
        let device = &self.device;
        // Each step re-decodes the full prefix with a fresh KV cache, quadratic in
        // output length. candle's Marian decoder keeps one cache for one batch
        // row, and beams diverge, so a shared incremental cache would be wrong.
        beam_search(generation, &special, |prefix| {
            model.reset_kv_cache();
            let ids = Tensor::new(prefix, device)?.unsqueeze(0)?;
            let logits = model.decode(&ids, &encoder_xs, 0)?.squeeze(0)?;
            let last = logits.get(logits.dim(0)? - 1)?;
            let log_probs = candle_nn::ops::log_softmax(&last, D::Minus1)?;
            Ok(log_probs.to_dtype(DType::F32)?.to_vec1::<f32>()?)
        })
    }

    fn decode(&self, tokens: &[u32]) -> anyhow::Result<String> {
        let ids: Vec<i64> = tokens.iter().map(|&t| i64::from(t)).collect();
        Ok(self.tokenizer.decode(&ids, true, true))
    }
}
