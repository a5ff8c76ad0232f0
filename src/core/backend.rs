//! Model provider seam
//!
//! The neural model is an external collaborator. A [`ModelProvider`] turns a
//! model identifier into a [`TranslationBackend`]; the backend exposes the
//! encode / generate / decode contract the dispatcher drives. Failures are
//! opaque `anyhow` errors, classified by the caller.

use crate::core::models::GenerationConfig;

/// Loaded tokenizer + model pair
pub trait TranslationBackend: Send {
    /// Source text to input token ids, end-of-sequence included
    fn encode(&self, text: &str) -> anyhow::Result<Vec<u32>>;

    /// Run decoding over the encoded input
    fn generate(&mut self, input: &[u32], config: &GenerationConfig) -> anyhow::Result<Vec<u32>>;

    /// Output token ids to text, special tokens skipped
    fn decode(&self, tokens: &[u32]) -> anyhow::Result<String>;
}

/// Constructs backends; called from a blocking worker thread
pub trait ModelProvider: Send + Sync {
    fn load(&self, model_id: &str) -> anyhow::Result<Box<dyn TranslationBackend>>;
}

/// Scripted provider and backend for exercising the orchestration layer
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Shared counters, observable after the backend moved into the cache
    #[derive(Debug, Default)]
    pub struct Probe {
        pub loads: AtomicUsize,
        pub generate_calls: AtomicUsize,
        pub active: AtomicUsize,
        pub max_active: AtomicUsize,
    }

    /// Backend that maps whole inputs to canned outputs
    pub struct FakeBackend {
        probe: Arc<Probe>,
        vocab: Vec<String>,
        replies: HashMap<String, String>,
        delay: Duration,
        fail_on: Option<String>,
    }

    impl TranslationBackend for FakeBackend {
        fn encode(&self, text: &str) -> anyhow::Result<Vec<u32>> {
            let id = self
                .vocab
                .iter()
                .position(|v| v == text)
                .ok_or_else(|| anyhow::anyhow!("unknown input: {}", text))?;
            Ok(vec![id as u32])
        }

        fn generate(&mut self, input: &[u32], _config: &GenerationConfig) -> anyhow::Result<Vec<u32>> {
            let running = self.probe.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.probe.max_active.fetch_max(running, Ordering::SeqCst);
            self.probe.generate_calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.probe.active.fetch_sub(1, Ordering::SeqCst);

            let text = &self.vocab[input[0] as usize];
            if self.fail_on.as_deref() == Some(text.as_str()) {
                anyhow::bail!("decoder exploded");
            }
            Ok(input.to_vec())
        }

        fn decode(&self, tokens: &[u32]) -> anyhow::Result<String> {
            let text = &self.vocab[tokens[0] as usize];
            Ok(self.replies.get(text).cloned().unwrap_or_else(|| text.clone()))
        }
    }

    /// Provider that builds [`FakeBackend`]s, optionally failing first
    pub struct FakeProvider {
        pub probe: Arc<Probe>,
        replies: Vec<(String, String)>,
        delay: Duration,
        load_delay: Duration,
        failures_left: Mutex<usize>,
        fail_on: Option<String>,
    }

    impl FakeProvider {
        pub fn new(replies: &[(&str, &str)]) -> Self {
            Self {
                probe: Arc::new(Probe::default()),
                replies: replies
                    .iter()
                    .map(|(s, t)| (s.to_string(), t.to_string()))
                    .collect(),
                delay: Duration::ZERO,
                load_delay: Duration::ZERO,
                failures_left: Mutex::new(0),
                fail_on: None,
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn with_load_delay(mut self, delay: Duration) -> Self {
            self.load_delay = delay;
            self
        }

        pub fn failing_loads(self, count: usize) -> Self {
            *self.failures_left.lock().unwrap() = count;
            self
        }

        pub fn failing_on(mut self, text: &str) -> Self {
            self.fail_on = Some(text.to_string());
            self
        }
    }

    impl ModelProvider for FakeProvider {
        fn load(&self, model_id: &str) -> anyhow::Result<Box<dyn TranslationBackend>> {
            std::thread::sleep(self.load_delay);
            self.probe.loads.fetch_add(1, Ordering::SeqCst);

            let mut failures = self.failures_left.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                anyhow::bail!("network unreachable while fetching {}", model_id);
            }

            Ok(Box::new(FakeBackend {
                probe: Arc::clone(&self.probe),
                vocab: self.replies.iter().map(|(s, _)| s.clone()).collect(),
                replies: self.replies.iter().cloned().collect(),
                delay: self.delay,
                fail_on: self.fail_on.clone(),
            }))
        }
    }
}
