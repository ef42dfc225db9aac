//! Recipe translation via a pretrained T5 model.
//!
//! The model is a process-wide resource: constructed lazily on first use
//! behind a lock, shared read-many afterwards, and torn down only at
//! process exit. Weights and tokenizer come from the HuggingFace Hub and
//! are cached on disk between runs.

use std::sync::{Arc, Mutex};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::t5;
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::config::TranslatorConfig;
use crate::error::{Error, Result};

/// Hard cap on input and output length, in tokens.
const MAX_TOKENS: usize = 512;

static SHARED: Mutex<Option<Arc<Translator>>> = Mutex::new(None);

/// Get the process-wide translator, constructing it on first call.
/// Construction downloads (or reuses cached) model weights, so the first
/// call is slow; later calls are a clone of the shared handle.
pub fn shared(config: &TranslatorConfig) -> Result<Arc<Translator>> {
    let mut guard = SHARED
        .lock()
        .map_err(|_| Error::Internal("Translator lock poisoned".to_string()))?;

    if let Some(translator) = guard.as_ref() {
        return Ok(translator.clone());
    }

    let translator = Arc::new(Translator::load(config)?);
    *guard = Some(translator.clone());
    Ok(translator)
}

pub struct Translator {
    tokenizer: Tokenizer,
    // The kv-cache mutates during generation
    model: Mutex<t5::T5ForConditionalGeneration>,
    config: t5::Config,
    device: Device,
}

impl Translator {
    /// Load tokenizer, config, and weights for the configured model.
    pub fn load(config: &TranslatorConfig) -> Result<Self> {
        info!("Loading translation model {}", config.model_id);

        let device = Device::Cpu;

        let api = Api::new()
            .map_err(|e| Error::Translate(format!("HF Hub API initialization failed: {e}")))?;
        let repo = api.model(config.model_id.clone());

        let config_path = repo
            .get("config.json")
            .map_err(|e| Error::Translate(format!("Config download failed: {e}")))?;
        let model_config: t5::Config = serde_json::from_str(&std::fs::read_to_string(config_path)?)
            .map_err(|e| Error::Translate(format!("Config parse failed: {e}")))?;

        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| Error::Translate(format!("Tokenizer download failed: {e}")))?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| Error::Translate(format!("Tokenizer load failed: {e}")))?;

        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| Error::Translate(format!("Weights download failed: {e}")))?;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| Error::Translate(format!("Weight mapping failed: {e}")))?
        };

        let model = t5::T5ForConditionalGeneration::load(vb, &model_config)
            .map_err(|e| Error::Translate(format!("Model load failed: {e}")))?;

        info!("Translation model {} ready", config.model_id);

        Ok(Self {
            tokenizer,
            model: Mutex::new(model),
            config: model_config,
            device,
        })
    }

    /// Translate text into the target language, greedy decoding.
    pub fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let prompt = build_prompt(text, target_language);

        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| Error::Translate(format!("Tokenization failed: {e}")))?;
        let mut input_ids = encoding.get_ids().to_vec();
        input_ids.truncate(MAX_TOKENS);

        let mut model = self
            .model
            .lock()
            .map_err(|_| Error::Internal("Translation model lock poisoned".to_string()))?;
        model.clear_kv_cache();

        let input = Tensor::new(input_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::Translate(format!("Input tensor failed: {e}")))?;
        let encoder_output = model
            .encode(&input)
            .map_err(|e| Error::Translate(format!("Encoder failed: {e}")))?;

        let start_token = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let mut output_ids = vec![start_token];

        // Greedy decoding
        let mut logits_processor = LogitsProcessor::new(0, None, None);

        for step in 0..MAX_TOKENS {
            let decoder_tokens = if step == 0 || !self.config.use_cache {
                Tensor::new(output_ids.as_slice(), &self.device)
            } else {
                let last = *output_ids.last().expect("output_ids is never empty");
                Tensor::new(&[last], &self.device)
            }
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::Translate(format!("Decoder tensor failed: {e}")))?;

            let logits = model
                .decode(&decoder_tokens, &encoder_output)
                .map_err(|e| Error::Translate(format!("Decoder failed: {e}")))?;
            let logits = last_position_logits(&logits)
                .map_err(|e| Error::Translate(format!("Logits reshape failed: {e}")))?;

            let next = logits_processor
                .sample(&logits)
                .map_err(|e| Error::Translate(format!("Sampling failed: {e}")))?;

            if next as usize == self.config.eos_token_id {
                break;
            }
            output_ids.push(next);
        }

        debug!(
            "Translated {} input tokens into {} output tokens",
            input_ids.len(),
            output_ids.len() - 1
        );

        self.tokenizer
            .decode(&output_ids[1..], true)
            .map_err(|e| Error::Translate(format!("Detokenization failed: {e}")))
    }
}

/// T5 task prefix, e.g. "translate English to French: two cups of flour".
fn build_prompt(text: &str, target_language: &str) -> String {
    format!("translate English to {target_language}: {text}")
}

/// Reduce decoder output to the logits of the final position, whatever the
/// batch/sequence shape the model returned.
fn last_position_logits(logits: &Tensor) -> candle_core::Result<Tensor> {
    let mut logits = logits.clone();
    while logits.rank() > 1 {
        let outer = logits.dim(0)?;
        logits = logits.get(outer - 1)?;
    }
    Ok(logits)
}
