// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Next-token network: embedding, one tanh hidden layer, softmax output.
//!
//! The input is the concatenated embeddings of a fixed window of previous
//! tokens. Training is plain mini-batch SGD on cross-entropy loss.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::stream;

/// Network shape and optimizer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// Tokens of history fed to the network
    pub context: usize,
    pub embedding: usize,
    pub hidden: usize,
    pub learning_rate: f32,
    pub batch_size: usize,
    /// Seed for weight init and epoch shuffling
    pub seed: u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            context: 4,
            embedding: 16,
            hidden: 64,
            learning_rate: 0.05,
            batch_size: 32,
            seed: 7,
        }
    }
}

/// One training pair: a context window of token indices and the next index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub context: Vec<usize>,
    pub target: usize,
}

/// Last `size` indices of `history`, left-padded with index 0 (`Bos`)
pub fn context_window(history: &[usize], size: usize) -> Vec<usize> {
    let take = history.len().min(size);
    let mut window = vec![0; size - take];
    window.extend_from_slice(&history[history.len() - take..]);
    window
}

/// Draw an index from an unnormalized distribution
pub fn sample_index<R: Rng>(weights: &[f32], rng: &mut R) -> usize {
    let total: f32 = weights.iter().sum();
    if weights.is_empty() || total <= 0.0 || !total.is_finite() {
        return 0;
    }
    let mut target = rng.gen::<f32>() * total;
    for (i, &w) in weights.iter().enumerate() {
        if target < w {
            return i;
        }
        target -= w;
    }
    weights.len() - 1
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn softmax(values: &mut [f32]) {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}

/// Network weights, stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    vocab: usize,
    context: usize,
    embedding: usize,
    hidden: usize,
    embed: Vec<f32>,
    w1: Vec<f32>,
    b1: Vec<f32>,
    w2: Vec<f32>,
    b2: Vec<f32>,
}

/// Activations kept for backpropagation
struct Forward {
    input: Vec<f32>,
    hidden: Vec<f32>,
    probs: Vec<f32>,
}

struct Gradients {
    embed: Vec<f32>,
    w1: Vec<f32>,
    b1: Vec<f32>,
    w2: Vec<f32>,
    b2: Vec<f32>,
}

impl Network {
    /// Fresh network with uniform weights in +-1/sqrt(fan_in)
    pub fn new(vocab: usize, hp: &Hyperparameters) -> Self {
        let mut rng = stream(hp.seed, 0);
        let n_in = hp.context * hp.embedding;
        let mut init = |len: usize, fan_in: usize| -> Vec<f32> {
            let scale = 1.0 / (fan_in.max(1) as f32).sqrt();
            (0..len).map(|_| rng.gen_range(-scale..=scale)).collect()
        };
        Self {
            vocab,
            context: hp.context,
            embedding: hp.embedding,
            hidden: hp.hidden,
            embed: init(vocab * hp.embedding, hp.embedding),
            w1: init(hp.hidden * n_in, n_in),
            b1: vec![0.0; hp.hidden],
            w2: init(vocab * hp.hidden, hp.hidden),
            b2: vec![0.0; vocab],
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab
    }

    pub fn context_size(&self) -> usize {
        self.context
    }

    fn input_size(&self) -> usize {
        self.context * self.embedding
    }

    /// True when every weight buffer matches the declared shape
    pub fn is_consistent(&self) -> bool {
        self.vocab > 0
            && self.context > 0
            && self.embed.len() == self.vocab * self.embedding
            && self.w1.len() == self.hidden * self.input_size()
            && self.b1.len() == self.hidden
            && self.w2.len() == self.vocab * self.hidden
            && self.b2.len() == self.vocab
    }

    fn forward(&self, context: &[usize]) -> Forward {
        let e = self.embedding;
        let n_in = self.input_size();
        let mut input = vec![0.0; n_in];
        for (slot, &token) in context.iter().enumerate().take(self.context) {
            let token = token.min(self.vocab - 1);
            input[slot * e..(slot + 1) * e].copy_from_slice(&self.embed[token * e..(token + 1) * e]);
        }

        let hidden: Vec<f32> = (0..self.hidden)
            .map(|j| (dot(&self.w1[j * n_in..(j + 1) * n_in], &input) + self.b1[j]).tanh())
            .collect();

        let h = self.hidden;
        let mut probs: Vec<f32> = (0..self.vocab)
            .map(|k| dot(&self.w2[k * h..(k + 1) * h], &hidden) + self.b2[k])
            .collect();
        softmax(&mut probs);

        Forward { input, hidden, probs }
    }

    /// Next-token distribution for a context window
    pub fn probabilities(&self, context: &[usize]) -> Vec<f32> {
        self.forward(context).probs
    }

    /// One SGD step over a mini-batch; returns the summed loss
    pub fn train_batch(&mut self, batch: &[Example], learning_rate: f32) -> f32 {
        if batch.is_empty() {
            return 0.0;
        }

        let e = self.embedding;
        let h = self.hidden;
        let n_in = self.input_size();
        let mut grads = Gradients {
            embed: vec![0.0; self.embed.len()],
            w1: vec![0.0; self.w1.len()],
            b1: vec![0.0; h],
            w2: vec![0.0; self.w2.len()],
            b2: vec![0.0; self.vocab],
        };
        let mut loss = 0.0;

        for example in batch {
            let target = example.target.min(self.vocab - 1);
            let Forward { input, hidden, probs } = self.forward(&example.context);
            loss -= probs[target].max(1e-12).ln();

            let mut d_logits = probs;
            d_logits[target] -= 1.0;

            let mut d_hidden = vec![0.0; h];
            for (k, &d) in d_logits.iter().enumerate() {
                grads.b2[k] += d;
                let row = k * h;
                for j in 0..h {
                    grads.w2[row + j] += d * hidden[j];
                    d_hidden[j] += d * self.w2[row + j];
                }
            }

            let mut d_input = vec![0.0; n_in];
            for j in 0..h {
                let d_pre = d_hidden[j] * (1.0 - hidden[j] * hidden[j]);
                grads.b1[j] += d_pre;
                let row = j * n_in;
                for i in 0..n_in {
                    grads.w1[row + i] += d_pre * input[i];
                    d_input[i] += d_pre * self.w1[row + i];
                }
            }

            for (slot, &token) in example.context.iter().enumerate().take(self.context) {
                let token = token.min(self.vocab - 1);
                for d in 0..e {
                    grads.embed[token * e + d] += d_input[slot * e + d];
                }
            }
        }

        let step = learning_rate / batch.len() as f32;
        for (weights, grad) in [
            (&mut self.embed, &grads.embed),
            (&mut self.w1, &grads.w1),
            (&mut self.b1, &grads.b1),
            (&mut self.w2, &grads.w2),
            (&mut self.b2, &grads.b2),
        ] {
            for (w, g) in weights.iter_mut().zip(grad) {
                *w -= step * g;
            }
        }

        loss
    }
}
