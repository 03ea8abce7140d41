//! Token sampling from logits
//!
//! ## Algorithm
//!
//! 1. `temperature == 0`: argmax.
//! 2. Otherwise logits are divided by the temperature and soft-maxed.
//! 3. `top_p` outside `(0, 1)`: multinomial draw over all probabilities.
//! 4. Otherwise nucleus sampling: candidates below `(1 - top_p) / (n - 1)`
//!    are dropped, the rest sorted by descending probability and cut once
//!    the cumulative mass exceeds `top_p`, then one is drawn. When no
//!    probability reaches the cutoff the draw falls back to step 3.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tensorbridge_core::{Error, Result, TensorView};
use tracing::trace;

use crate::tensor::Tensor;

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SampleOptions {
    /// Softmax temperature; 0 selects the argmax
    pub temperature: f64,
    /// Nucleus mass; values outside `(0, 1)` disable nucleus sampling
    pub top_p: f64,
    /// Seed for a reproducible draw
    pub seed: Option<u64>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 1.0,
            seed: None,
        }
    }
}

impl SampleOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the nucleus mass.
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    /// Seed the random draw.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }
        if self.top_p.is_nan() {
            return Err(Error::InvalidArgument("top_p must be a number".to_string()));
        }
        Ok(())
    }
}

/// Stateful sampler; reuses one random generator across draws.
pub struct Sampler {
    temperature: f64,
    top_p: f64,
    rng: StdRng,
}

impl Sampler {
    /// Sampler for the given options.
    pub fn new(options: &SampleOptions) -> Result<Self> {
        options.validate()?;
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            temperature: options.temperature,
            top_p: options.top_p,
            rng,
        })
    }

    /// Draw one index from a logits tensor of shape `[N]` or `[1, N]`.
    pub fn sample(&mut self, logits: &TensorView) -> Result<usize> {
        let logits = logits_of(logits)?;
        let index = self.sample_slice(&logits);
        trace!(index, n = logits.len(), "Sampled");
        Ok(index)
    }

    fn sample_slice(&mut self, logits: &[f64]) -> usize {
        if self.temperature == 0.0 || logits.len() == 1 {
            return argmax(logits);
        }
        let probs = softmax(logits, self.temperature);
        let coin: f64 = self.rng.gen();
        if self.top_p <= 0.0 || self.top_p >= 1.0 {
            multinomial(&probs, coin)
        } else {
            top_p(&probs, self.top_p, coin)
        }
    }
}

/// Draw one index from `logits` with fresh generator state.
pub fn sample(logits: &Tensor, options: &SampleOptions) -> Result<usize> {
    Sampler::new(options)?.sample(logits.view())
}

fn logits_of(view: &TensorView) -> Result<Vec<f64>> {
    let shape = view.shape();
    if !matches!(shape, [_] | [1, _]) {
        return Err(Error::InvalidArgument(format!(
            "the shape of logits must be [N] or [1, N], got {:?}",
            shape
        )));
    }
    if view.numel() == 0 {
        return Err(Error::InvalidArgument(
            "the logits must not be empty".to_string(),
        ));
    }
    let values = view.to_f64_vec();
    if let Some(index) = values.iter().position(|v| v.is_nan()) {
        return Err(Error::InvalidArgument(format!(
            "logit {} is not a number",
            index
        )));
    }
    Ok(values)
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn softmax(logits: &[f64], temperature: f64) -> Vec<f64> {
    let scaled: Vec<f64> = logits.iter().map(|v| v / temperature).collect();
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scaled.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn multinomial(probs: &[f64], coin: f64) -> usize {
    let mut cdf = 0.0;
    for (i, p) in probs.iter().enumerate() {
        cdf += p;
        if coin < cdf {
            return i;
        }
    }
    // rounding left the coin above the total mass
    probs.len() - 1
}

fn top_p(probs: &[f64], top_p: f64, coin: f64) -> usize {
    let cutoff = (1.0 - top_p) / (probs.len() - 1) as f64;
    let mut candidates: Vec<(usize, f64)> = probs
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| *p >= cutoff)
        .collect();
    if candidates.is_empty() {
        return multinomial(probs, coin);
    }
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut cumulative = 0.0;
    let mut last = candidates.len().saturating_sub(1);
    for (i, (_, p)) in candidates.iter().enumerate() {
        cumulative += p;
        if cumulative > top_p {
            last = i;
            break;
        }
    }

    let r = coin * cumulative;
    let mut cdf = 0.0;
    for (index, p) in &candidates[..=last] {
        cdf += p;
        if r < cdf {
            return *index;
        }
    }
    candidates[last].0
}
