//! Short identifiers for import bindings.

use std::collections::HashSet;

use tsval_core::IdStrategy;

use crate::error::CodegenError;

const RANDOM_ID_LEN: usize = 8;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Hands out identifiers that are unique within one aggregation batch.
#[derive(Debug)]
pub struct IdGenerator {
    strategy: IdStrategy,
    issued: HashSet<String>,
    next: usize,
}

impl IdGenerator {
    #[must_use]
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            issued: HashSet::new(),
            next: 0,
        }
    }

    /// Next identifier for this batch.
    ///
    /// # Errors
    /// `IdGeneration` when the system random source is unavailable.
    pub fn next_id(&mut self) -> Result<String, CodegenError> {
        match self.strategy {
            IdStrategy::Sequential => {
                let id = self.next.to_string();
                self.next += 1;
                Ok(id)
            }
            IdStrategy::Random => loop {
                let id = random_letters()?;
                if self.issued.insert(id.clone()) {
                    return Ok(id);
                }
                tracing::debug!(%id, "validator id collision, retrying");
            },
        }
    }
}

fn random_letters() -> Result<String, CodegenError> {
    let mut bytes = [0u8; RANDOM_ID_LEN];
    getrandom::fill(&mut bytes).map_err(|e| CodegenError::IdGeneration(e.to_string()))?;
    Ok(bytes
        .iter()
        .map(|b| char::from(LETTERS[usize::from(*b) % LETTERS.len()]))
        .collect())
}
