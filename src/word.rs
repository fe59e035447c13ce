use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

static DICT_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/dicts");

/// A dictionary entry: the romaji headword to type and its furigana notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub name: String,
    #[serde(default)]
    pub notation: Option<String>,
    #[serde(default)]
    pub trans: Vec<String>,
}

impl Word {
    pub fn new(name: impl Into<String>, notation: Option<&str>) -> Self {
        Self {
            name: name.into(),
            notation: notation.map(str::to_string),
            trans: Vec::new(),
        }
    }

    /// Reads an entry without failing. A missing or non-string `name` gives an
    /// empty headword; a non-string `notation` is dropped.
    pub fn from_value(value: &Value) -> Self {
        let name = match value.get("name") {
            Some(Value::String(name)) => name.clone(),
            other => {
                warn!(?other, "dictionary entry has no string name");
                String::new()
            }
        };
        let notation = value
            .get("notation")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string);
        let trans = value
            .get("trans")
            .and_then(Value::as_array)
            .map(|t| {
                t.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name,
            notation,
            trans,
        }
    }

    /// The headword as typed: an ellipsis is entered as two dots.
    pub fn headword(&self) -> String {
        self.name.replace('…', "..")
    }
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary '{0}' not found")]
    NotFound(String),
    #[error("dictionary '{0}' is not valid utf-8")]
    NotUtf8(String),
    #[error("dictionary is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RawDictionary {
    name: String,
    #[serde(default)]
    words: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    pub name: String,
    pub words: Vec<Word>,
}

impl Dictionary {
    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let raw: RawDictionary = serde_json::from_str(json)?;
        Ok(Self {
            name: raw.name,
            words: raw.words.iter().map(Word::from_value).collect(),
        })
    }

    /// Loads one of the dictionaries bundled with the binary.
    pub fn bundled(name: &str) -> Result<Self, DictionaryError> {
        let file = DICT_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| DictionaryError::NotFound(name.to_string()))?;
        let json = file
            .contents_utf8()
            .ok_or_else(|| DictionaryError::NotUtf8(name.to_string()))?;
        Self::from_json(json)
    }

    pub fn bundled_names() -> Vec<String> {
        let mut names: Vec<String> = DICT_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .filter_map(|s| s.to_str())
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }
}
