use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bigram::BigramModel;
use crate::error::{ModelError, Result};
use crate::tokenizer::Vocab;

/// Score given to every transition a config does not mention.
pub const DEFAULT_SCORE: f32 = -10.0;

/// JSON description of a bigram toy model and its vocabulary.
///
/// ```json
/// {
///   "tokens": ["<eos>", "hi", " there"],
///   "eos": "<eos>",
///   "start": { "hi": 2.0 },
///   "transitions": { "hi": { " there": 1.5, "<eos>": 0.2 } }
/// }
/// ```
///
/// Scores are keyed by token text. Every pair not listed scores
/// [`DEFAULT_SCORE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToyModelConfig {
    pub tokens: Vec<String>,
    pub eos: String,
    #[serde(default)]
    pub start: BTreeMap<String, f32>,
    #[serde(default)]
    pub transitions: BTreeMap<String, BTreeMap<String, f32>>,
}

impl ToyModelConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading toy model from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// A small built-in vocabulary of a few short sentences.
    pub fn demo() -> Self {
        const TOKENS: [&str; 11] = [
            "<eos>", "The", " cat", " dog", " sat", " ran", " on", " the", " mat", " away", ".",
        ];
        const START: [(&str, f32); 1] = [("The", 3.0)];
        const TRANSITIONS: [(&str, &[(&str, f32)]); 10] = [
            ("The", &[(" cat", 2.0), (" dog", 1.6)]),
            (" the", &[(" mat", 2.5), (" cat", 0.5), (" dog", 0.3)]),
            (" cat", &[(" sat", 2.0), (" ran", 1.2)]),
            (" dog", &[(" ran", 2.0), (" sat", 1.0)]),
            (" sat", &[(" on", 2.5), (".", 0.5)]),
            (" ran", &[(" away", 2.0), (" on", 1.0)]),
            (" on", &[(" the", 3.0)]),
            (" mat", &[(".", 2.0), ("<eos>", 0.5)]),
            (" away", &[(".", 2.5)]),
            (".", &[("<eos>", 3.0), ("The", 0.5)]),
        ];

        let row = |entries: &[(&str, f32)]| {
            entries
                .iter()
                .map(|&(tok, score)| (tok.to_string(), score))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            tokens: TOKENS.iter().map(|t| t.to_string()).collect(),
            eos: "<eos>".to_string(),
            start: row(&START),
            transitions: TRANSITIONS
                .iter()
                .map(|&(prev, entries)| (prev.to_string(), row(entries)))
                .collect(),
        }
    }

    /// Validate the config and build the model and its vocabulary.
    pub fn build(&self) -> Result<(BigramModel, Vocab)> {
        let mut ids = HashMap::with_capacity(self.tokens.len());
        for (id, tok) in self.tokens.iter().enumerate() {
            if ids.insert(tok.as_str(), id).is_some() {
                return Err(ModelError::InvalidConfig(format!(
                    "duplicate token {:?}",
                    tok
                )));
            }
        }
        let lookup = |tok: &str| {
            ids.get(tok)
                .copied()
                .ok_or_else(|| ModelError::InvalidConfig(format!("unknown token {:?}", tok)))
        };

        let vocab_size = self.tokens.len();
        let fill = |entries: &BTreeMap<String, f32>| -> Result<Vec<f32>> {
            let mut row = vec![DEFAULT_SCORE; vocab_size];
            for (tok, &score) in entries {
                row[lookup(tok.as_str())?] = score;
            }
            Ok(row)
        };

        let start = fill(&self.start)?;
        let mut transitions = vec![vec![DEFAULT_SCORE; vocab_size]; vocab_size];
        for (prev, entries) in &self.transitions {
            transitions[lookup(prev.as_str())?] = fill(entries)?;
        }

        let eos_id = lookup(self.eos.as_str())? as u32;
        let vocab = Vocab::new(self.tokens.clone(), eos_id)?;
        let model = BigramModel::new(start, transitions)?;
        tracing::debug!("Built toy model with {} tokens", vocab_size);

        Ok((model, vocab))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;
    use crate::ScoreModel;
    use std::io::Write;

    const JSON: &str = r#"{
        "tokens": ["<eos>", "hi", " there"],
        "eos": "<eos>",
        "start": { "hi": 2.0 },
        "transitions": { "hi": { " there": 1.5, "<eos>": 0.2 } }
    }"#;

    #[tokio::test]
    async fn test_build_from_json() {
        let config = ToyModelConfig::from_json_str(JSON).unwrap();
        let (model, vocab) = config.build().unwrap();

        assert_eq!(vocab.eos_id(), 0);
        assert_eq!(model.vocab_size(), 3);
        assert_eq!(model.forward(&[]).await.unwrap(), vec![DEFAULT_SCORE, 2.0, DEFAULT_SCORE]);
        assert_eq!(model.forward(&[1]).await.unwrap(), vec![0.2, DEFAULT_SCORE, 1.5]);
        assert_eq!(model.forward(&[2]).await.unwrap(), vec![DEFAULT_SCORE; 3]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(JSON.as_bytes()).unwrap();

        let config = ToyModelConfig::load(file.path()).unwrap();
        assert_eq!(config.tokens.len(), 3);
        assert_eq!(config, ToyModelConfig::from_json_str(JSON).unwrap());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ToyModelConfig::load("/nonexistent/toy.json").unwrap_err();
        assert!(matches!(err, ModelError::Io(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = ToyModelConfig::from_json_str("{ \"tokens\": [").unwrap_err();
        assert!(matches!(err, ModelError::Json(_)));
    }

    #[test]
    fn test_unknown_token_rejected() {
        let mut config = ToyModelConfig::from_json_str(JSON).unwrap();
        config.start.insert("bye".to_string(), 1.0);
        let err = config.build().unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig(_)));
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let mut config = ToyModelConfig::from_json_str(JSON).unwrap();
        config.tokens.push("hi".to_string());
        assert!(config.build().is_err());
    }

    #[test]
    fn test_unknown_eos_rejected() {
        let mut config = ToyModelConfig::from_json_str(JSON).unwrap();
        config.eos = "</s>".to_string();
        assert!(config.build().is_err());
    }

    #[test]
    fn test_demo_builds() {
        let (model, vocab) = ToyModelConfig::demo().build().unwrap();
        assert_eq!(model.vocab_size(), vocab.len());
        assert_eq!(vocab.encode("The cat sat on the mat.").unwrap().len(), 7);
    }
}
