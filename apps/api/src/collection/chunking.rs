//! Token-bounded splitting of long page text.

use anyhow::Result;
use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Rough characters-per-token ratio used when the tokenizer is unavailable.
pub const CHARS_PER_TOKEN: usize = 4;

pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Option<Vec<u32>>;
    fn decode(&self, tokens: &[u32]) -> Option<String>;

    /// Token count, or a character-based estimate when encoding fails.
    fn count(&self, text: &str) -> usize {
        self.encode(text)
            .map(|tokens| tokens.len())
            .unwrap_or_else(|| text.chars().count().div_ceil(CHARS_PER_TOKEN))
    }
}

/// Byte-pair encoder shared by every request.
pub struct BpeTokenizer {
    bpe: CoreBPE,
}

impl BpeTokenizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            bpe: tiktoken_rs::cl100k_base()?,
        })
    }
}

impl Tokenizer for BpeTokenizer {
    fn encode(&self, text: &str) -> Option<Vec<u32>> {
        Some(
            self.bpe
                .encode_with_special_tokens(text)
                .into_iter()
                .map(|t| t as u32)
                .collect(),
        )
    }

    fn decode(&self, tokens: &[u32]) -> Option<String> {
        self.bpe
            .decode(tokens.iter().map(|&t| t as _).collect())
            .ok()
    }
}

/// Contiguous slices of at most `max_tokens` tokens each. An empty sequence
/// still yields one (empty) chunk.
pub fn split_tokens(tokens: &[u32], max_tokens: usize) -> Vec<&[u32]> {
    if tokens.is_empty() {
        return vec![tokens];
    }
    tokens.chunks(max_tokens.max(1)).collect()
}

/// Splits `text` into chunks of at most `max_tokens` tokens, in order.
///
/// Falls back to a `max_tokens * CHARS_PER_TOKEN` character split when the
/// text cannot be encoded or any chunk fails to decode (a chunk boundary
/// that lands inside a multi-byte character, for instance).
pub fn chunk_text(text: &str, max_tokens: usize, tokenizer: &dyn Tokenizer) -> Vec<String> {
    let max_tokens = max_tokens.max(1);

    let Some(tokens) = tokenizer.encode(text) else {
        warn!("Tokenizer could not encode page text; splitting by characters");
        return split_chars(text, max_tokens * CHARS_PER_TOKEN);
    };

    let decoded: Option<Vec<String>> = split_tokens(&tokens, max_tokens)
        .into_iter()
        .map(|chunk| tokenizer.decode(chunk))
        .collect();

    decoded.unwrap_or_else(|| {
        warn!("Tokenizer could not decode a chunk; splitting by characters");
        split_chars(text, max_tokens * CHARS_PER_TOKEN)
    })
}

fn split_chars(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}


#[cfg(test)]
mod tests {
    use super::testing::{BrokenTokenizer, CharTokenizer};
    use super::*;

    #[test]
    fn test_split_tokens_reconstructs_sequence() {
        let tokens: Vec<u32> = (0..23).collect();
        let chunks = split_tokens(&tokens, 5);

        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.len() <= 5));
        assert_eq!(chunks.concat(), tokens);
    }

    #[test]
    fn test_chunk_text_within_budget_is_single_chunk() {
        let chunks = chunk_text("short page", 100, &CharTokenizer);
        assert_eq!(chunks, vec!["short page".to_string()]);
    }

    #[test]
    fn test_chunk_text_exact_budget_is_single_chunk() {
        let chunks = chunk_text("abcde", 5, &CharTokenizer);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_chunk_text_concatenation_is_lossless() {
        let text = "Portfolio of Ada: analytical engines, notes on Bernoulli numbers.";
        let chunks = chunk_text(text, 7, &CharTokenizer);

        assert_eq!(chunks.len(), text.chars().count().div_ceil(7));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_chunk_text_falls_back_to_characters() {
        let text = "x".repeat(50);
        let chunks = chunk_text(&text, 3, &BrokenTokenizer);

        // 3 tokens * 4 chars per chunk
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0].len(), 12);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_count_estimates_when_encoding_fails() {
        assert_eq!(BrokenTokenizer.count("abcdefghi"), 3);
        assert_eq!(CharTokenizer.count("abcdefghi"), 9);
    }

    #[test]
    fn test_bpe_chunks_decode_back_to_text() {
        let tokenizer = BpeTokenizer::new().unwrap();
        let text = "Rust engineer building async services with tokio and axum. ".repeat(40);

        let tokens = tokenizer.encode(&text).unwrap();
        let chunks = chunk_text(&text, 50, &tokenizer);

        assert_eq!(chunks.len(), tokens.len().div_ceil(50));
        assert_eq!(chunks.concat(), text);
    }
}
