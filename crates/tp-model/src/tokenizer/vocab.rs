use std::collections::HashMap;

use super::Tokenizer;
use crate::error::{ModelError, Result};

/// A fixed token vocabulary.
#[derive(Debug)]
pub struct Vocab {
    /// Token strings, indexed by token ID.
    tokens: Vec<String>,
    /// Reverse mapping from token string to token ID.
    token_to_id: HashMap<String, u32>,
    /// Byte length of the longest token, bounds the prefix search in `encode`.
    max_token_len: usize,
    /// End-of-sequence token ID.
    eos_id: u32,
}

impl Vocab {
    /// Build a vocabulary from token strings and the id of the end-of-sequence
    /// token.
    ///
    /// When a string appears more than once, text lookups resolve to its first id.
    pub fn new(tokens: Vec<String>, eos_id: u32) -> Result<Vocab> {
        if tokens.is_empty() {
            return Err(ModelError::InvalidConfig("vocabulary is empty".to_string()));
        }
        if eos_id as usize >= tokens.len() {
            return Err(ModelError::TokenOutOfRange {
                id: eos_id,
                vocab_size: tokens.len(),
            });
        }

        let mut token_to_id = HashMap::with_capacity(tokens.len());
        for (id, tok) in tokens.iter().enumerate() {
            token_to_id.entry(tok.clone()).or_insert(id as u32);
        }
        let max_token_len = tokens.iter().map(String::len).max().unwrap_or(0);

        Ok(Vocab {
            tokens,
            token_to_id,
            max_token_len,
            eos_id,
        })
    }

    /// Number of tokens in the vocabulary.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Raw token string, without byte-token translation.
    pub fn token(&self, token_id: u32) -> Option<&str> {
        self.tokens.get(token_id as usize).map(String::as_str)
    }

    pub fn id_of(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    /// Encode text by repeatedly taking the longest vocabulary entry that
    /// prefixes the remaining input.
    ///
    /// A character with no matching entry falls back to the `<0xHH>` byte
    /// tokens of its UTF-8 encoding. If any of those is missing too, encoding
    /// fails with [`ModelError::UnknownText`].
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let mut ids = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            let longest = self.max_token_len.min(rest.len());

            let matched = (1..=longest)
                .rev()
                .filter(|&len| rest.is_char_boundary(len))
                .find_map(|len| self.id_of(&rest[..len]).map(|id| (id, len)));

            match matched {
                Some((id, len)) => {
                    ids.push(id);
                    pos += len;
                }
                None => {
                    let ch = rest.chars().next().ok_or_else(|| {
                        ModelError::UnknownText(rest.to_string())
                    })?;
                    let mut buf = [0u8; 4];
                    for &byte in ch.encode_utf8(&mut buf).as_bytes() {
                        let id = self
                            .id_of(&format!("<0x{:02X}>", byte))
                            .ok_or_else(|| ModelError::UnknownText(rest.to_string()))?;
                        ids.push(id);
                    }
                    pos += ch.len_utf8();
                }
            }
        }

        Ok(ids)
    }

    /// Decode a sequence of token IDs back into a string.
    ///
    /// Byte-level tokens of the form `<0xHH>` are converted back to the
    /// corresponding byte before the whole buffer is read as (lossy) UTF-8.
    pub fn decode_all(&self, token_ids: &[u32]) -> Result<String> {
        let mut bytes: Vec<u8> = Vec::new();
        for &id in token_ids {
            let tok = self.token(id).ok_or(ModelError::TokenOutOfRange {
                id,
                vocab_size: self.len(),
            })?;
            match parse_byte_token(tok) {
                Some(byte) => bytes.push(byte),
                None => bytes.extend_from_slice(tok.as_bytes()),
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn parse_byte_token(tok: &str) -> Option<u8> {
    if tok.starts_with("<0x") && tok.ends_with('>') && tok.len() == 6 {
        u8::from_str_radix(&tok[3..5], 16).ok()
    } else {
        None
    }
}

impl Tokenizer for Vocab {
    fn decode(&self, token_id: u32) -> Result<String> {
        self.decode_all(&[token_id])
    }

    fn eos_id(&self) -> u32 {
        self.eos_id
    }
}
