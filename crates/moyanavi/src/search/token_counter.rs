use serde::Serialize;
use tiktoken_rs::CoreBPE;

use super::body;
use crate::errors::SearchError;

/// Token budget for the search context handed back to the agent.
pub const DEFAULT_MAX_TOKENS: usize = 4000;

pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    pub fn new() -> Result<Self, SearchError> {
        let bpe =
            tiktoken_rs::cl100k_base().map_err(|e| SearchError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// The longest prefix of `items` whose serialized entries fit in
    /// `max_tokens` together. Stops at the first entry that does not fit.
    pub fn take_within<T: Serialize>(
        &self,
        items: Vec<T>,
        max_tokens: usize,
    ) -> Result<Vec<T>, SearchError> {
        let total = items.len();
        let mut kept = Vec::new();
        let mut used = 0;

        for item in items {
            let tokens = self.count_tokens(&body::to_body(&item)?);
            if used + tokens > max_tokens {
                break;
            }
            used += tokens;
            kept.push(item);
        }

        if kept.len() < total {
            tracing::debug!(kept = kept.len(), total, used, max_tokens, "trimmed search context");
        }
        Ok(kept)
    }
}
