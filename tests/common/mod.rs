//! Shared fixtures for integration tests

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use treefold::{LeafSource, MergeCapability};

pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

static INIT_LOGGING: Once = Once::new();

/// Route scheduler logs through tracing; honors RUST_LOG
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Leaf source serving one letter per index, with optional gaps
pub struct LetterSource {
    letters: Vec<String>,
    missing: HashSet<usize>,
}

impl LetterSource {
    pub fn alphabet() -> Self {
        Self {
            letters: ALPHABET.chars().map(|c| c.to_string()).collect(),
            missing: HashSet::new(),
        }
    }

    pub fn alphabet_without(missing: &[usize]) -> Self {
        let mut source = Self::alphabet();
        source.missing = missing.iter().copied().collect();
        source
    }

    pub fn single(letter: &str) -> Self {
        Self {
            letters: vec![letter.to_string()],
            missing: HashSet::new(),
        }
    }
}

#[async_trait]
impl LeafSource<String> for LetterSource {
    async fn leaf_count(&self) -> Result<usize> {
        Ok(self.letters.len())
    }

    async fn leaf_exists(&self, index: usize) -> Result<bool> {
        Ok(index < self.letters.len() && !self.missing.contains(&index))
    }

    async fn load_leaf(&self, index: usize) -> Result<String> {
        if self.missing.contains(&index) {
            return Err(anyhow!("leaf {index} is missing"));
        }
        self.letters
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("leaf {index} out of range"))
    }
}

/// Order-sensitive concatenating merge that counts its invocations
#[derive(Default)]
pub struct ConcatMerge {
    executions: AtomicUsize,
}

impl ConcatMerge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MergeCapability<String> for ConcatMerge {
    async fn merge(&self, inputs: Vec<String>) -> Result<String> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(inputs.concat())
    }
}

/// Concatenating merge that refuses any input containing a poison substring
pub struct PoisonedMerge {
    poison: String,
}

impl PoisonedMerge {
    pub fn new(poison: &str) -> Self {
        Self {
            poison: poison.to_string(),
        }
    }
}

#[async_trait]
impl MergeCapability<String> for PoisonedMerge {
    async fn merge(&self, inputs: Vec<String>) -> Result<String> {
        if inputs.iter().any(|i| i.contains(&self.poison)) {
            return Err(anyhow!(
                "refusing to merge input containing {:?}",
                self.poison
            ));
        }
        Ok(inputs.concat())
    }
}

/// Concatenating merge that panics outright on a poison substring
pub struct ExplodingMerge {
    poison: String,
}

impl ExplodingMerge {
    pub fn new(poison: &str) -> Self {
        Self {
            poison: poison.to_string(),
        }
    }
}

#[async_trait]
impl MergeCapability<String> for ExplodingMerge {
    async fn merge(&self, inputs: Vec<String>) -> Result<String> {
        if inputs.iter().any(|i| i.contains(&self.poison)) {
            panic!("merge blew up on input containing {:?}", self.poison);
        }
        Ok(inputs.concat())
    }
}
