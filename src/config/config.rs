use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::ConfigError;
use super::rcfile::{Environment, RcfileLocator};
use super::style::{StyleSet, StyleSetPatch};

pub const IGNORE_CASE_MATCH: &str = "IgnoreCase";
pub const CASE_SENSITIVE_MATCH: &str = "CaseSensitive";
pub const REGEXP_MATCH: &str = "Regexp";

pub const DEFAULT_PROMPT: &str = "QUERY>";

/// Everything a user can set in the config file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// Named actions composed from a sequence of other actions
    pub action: HashMap<String, Vec<String>>,

    /// Key name to action name. Recorded here, dispatched elsewhere.
    pub keymap: HashMap<String, String>,

    /// Name of the matcher selected at startup
    pub matcher: String,

    pub style: StyleSet,

    /// Matcher name to external command line
    pub custom_matcher: HashMap<String, Vec<String>>,

    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            action: HashMap::new(),
            keymap: HashMap::new(),
            matcher: IGNORE_CASE_MATCH.to_string(),
            style: StyleSet::default(),
            custom_matcher: HashMap::new(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

const FIELD_NAMES: [&str; 6] = [
    "Action",
    "Keymap",
    "Matcher",
    "Style",
    "CustomMatcher",
    "Prompt",
];

/// Rename keys matching one of `names` ignoring case. An exact match wins
/// over any differently-cased duplicate.
fn canonical_keys(map: Map<String, Value>, names: &[&str]) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        match names.iter().find(|name| name.eq_ignore_ascii_case(&key)) {
            Some(name) if *name != key => {
                out.entry(*name).or_insert(value);
            }
            _ => {
                out.insert(key, value);
            }
        }
    }
    out
}

/// The fields present in a config document.
///
/// Absent fields (and fields set to `null`) stay `None` and leave the target
/// untouched when applied. Field names match regardless of case, unknown keys
/// are ignored, and anything after the first JSON value is not read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigPatch {
    pub action: Option<HashMap<String, Vec<String>>>,
    pub keymap: Option<HashMap<String, String>>,
    pub matcher: Option<String>,
    pub style: Option<StyleSetPatch>,
    pub custom_matcher: Option<HashMap<String, Vec<String>>>,
    pub prompt: Option<String>,
}

impl ConfigPatch {
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        let mut de = serde_json::Deserializer::from_reader(reader);
        Self::from_value(Value::deserialize(&mut de)?)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> serde_json::Result<Self> {
        let mut de = serde_json::Deserializer::from_str(s);
        Self::from_value(Value::deserialize(&mut de)?)
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => {
                let mut map = canonical_keys(map, &FIELD_NAMES);
                if let Some(Value::Object(style)) = map.get_mut("Style") {
                    *style = canonical_keys(std::mem::take(style), &StyleSet::SLOT_NAMES);
                }
                serde_json::from_value(Value::Object(map))
            }
            other => serde_json::from_value(other),
        }
    }

    /// Overwrite each present field of `config`. Maps are replaced whole.
    pub fn apply_to(self, config: &mut Config) {
        if let Some(action) = self.action {
            config.action = action;
        }
        if let Some(keymap) = self.keymap {
            config.keymap = keymap;
        }
        if let Some(matcher) = self.matcher {
            config.matcher = matcher;
        }
        if let Some(style) = self.style {
            style.apply_to(&mut config.style);
        }
        if let Some(custom_matcher) = self.custom_matcher {
            config.custom_matcher = custom_matcher;
        }
        if let Some(prompt) = self.prompt {
            config.prompt = prompt;
        }
    }
}

impl Config {
    pub fn apply(&mut self, patch: ConfigPatch) {
        patch.apply_to(self);
    }

    /// Read a config file on top of the current settings.
    ///
    /// The document is decoded completely before anything is applied, so on
    /// error `self` is left exactly as it was.
    pub fn read_filename<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        debug!(target: "config", "Reading config from {}", path.display());

        let file = File::open(path).map_err(|source| ConfigError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let patch =
            ConfigPatch::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        self.apply(patch);
        Ok(())
    }

    /// Locate the config file in the process environment and load it
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        Self::load_with(&RcfileLocator::new())
    }

    pub fn load_with<E: Environment>(
        locator: &RcfileLocator<E>,
    ) -> Result<(Self, PathBuf), ConfigError> {
        let path = locator.locate()?;
        let mut config = Self::default();
        config.read_filename(&path)?;
        info!(target: "config", "Loaded config from {}", path.display());
        Ok((config, path))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::style::{Attribute, Style};

    fn decode_onto_default(json: &str) -> Config {
        let mut config = Config::default();
        config.apply(ConfigPatch::from_str(json).unwrap());
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.action.is_empty());
        assert!(config.keymap.is_empty());
        assert!(config.custom_matcher.is_empty());
        assert_eq!(config.matcher, "IgnoreCase");
        assert_eq!(config.prompt, "QUERY>");
        assert_eq!(config.style, StyleSet::default());
    }

    #[test]
    fn test_empty_document_changes_nothing() {
        assert_eq!(decode_onto_default("{}"), Config::default());
    }

    #[test]
    fn test_prompt_only() {
        let config = decode_onto_default(r#"{"Prompt": "> "}"#);
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.matcher, "IgnoreCase");
        assert_eq!(config.style, StyleSet::default());
    }

    #[test]
    fn test_null_fields_keep_defaults() {
        let config = decode_onto_default(r#"{"Keymap": null, "Prompt": null}"#);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = decode_onto_default(r#"{"Layout": "bottom-up", "Matcher": "Regexp"}"#);
        assert_eq!(config.matcher, REGEXP_MATCH);
    }

    #[test]
    fn test_field_names_ignore_case() {
        let config = decode_onto_default(
            r#"{"prompt": "> ", "MATCHER": "Regexp", "style": {"matched": ["green"]}}"#,
        );
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.matcher, REGEXP_MATCH);
        assert_eq!(
            config.style.matched,
            Style::new(Attribute::GREEN, Attribute::DEFAULT)
        );
    }

    #[test]
    fn test_exact_field_name_wins() {
        let config = decode_onto_default(r#"{"prompt": "lower", "Prompt": "exact"}"#);
        assert_eq!(config.prompt, "exact");

        let config = decode_onto_default(r#"{"Prompt": "exact", "PROMPT": "upper"}"#);
        assert_eq!(config.prompt, "exact");
    }

    #[test]
    fn test_trailing_content_not_read() {
        let config = decode_onto_default("{\"Prompt\": \"> \"}\n# trailing");
        assert_eq!(config.prompt, "> ");
    }

    #[test]
    fn test_null_document_is_no_op() {
        assert_eq!(decode_onto_default("null"), Config::default());
        assert!(ConfigPatch::from_str("").is_err());
    }

    #[test]
    fn test_null_style_slot_resets() {
        let config = decode_onto_default(r#"{"Style": {"Selected": null}}"#);
        assert_eq!(config.style.selected, Style::default());
        assert_eq!(
            config.style.saved_selection,
            StyleSet::default().saved_selection
        );
    }

    #[test]
    fn test_keymap_replaces_whole_map() {
        let mut config = Config::default();
        config
            .keymap
            .insert("C-n".to_string(), "peco.SelectDown".to_string());

        config.apply(ConfigPatch::from_str(r#"{"Keymap": {"C-p": "peco.SelectUp"}}"#).unwrap());

        assert_eq!(config.keymap.len(), 1);
        assert_eq!(config.keymap["C-p"], "peco.SelectUp");
        assert!(!config.keymap.contains_key("C-n"));
    }

    #[test]
    fn test_full_document() {
        let config = decode_onto_default(
            r#"{
                "Action": {"foo.SelectTwice": ["peco.SelectDown", "peco.SelectDown"]},
                "Keymap": {"M-v": "peco.SelectUp", "C-x,C-c": "peco.Cancel"},
                "Matcher": "CaseSensitive",
                "CustomMatcher": {"Migemo": ["/usr/bin/migemogrep", "$QUERY"]},
                "Prompt": "[peco]",
                "Style": {
                    "Basic": ["on_default", "default"],
                    "Selected": ["underline", "on_cyan", "black"],
                    "Matched": ["red", "on_white"]
                }
            }"#,
        );

        assert_eq!(
            config.action["foo.SelectTwice"],
            vec!["peco.SelectDown", "peco.SelectDown"]
        );
        assert_eq!(config.keymap["C-x,C-c"], "peco.Cancel");
        assert_eq!(config.matcher, CASE_SENSITIVE_MATCH);
        assert_eq!(config.custom_matcher["Migemo"][1], "$QUERY");
        assert_eq!(config.prompt, "[peco]");

        assert_eq!(
            config.style.selected,
            Style::new(Attribute::BLACK | Attribute::UNDERLINE, Attribute::CYAN)
        );
        assert_eq!(
            config.style.matched,
            Style::new(Attribute::RED, Attribute::WHITE)
        );
        assert_eq!(config.style.basic, Style::default());
        assert_eq!(
            config.style.saved_selection,
            StyleSet::default().saved_selection
        );
    }

    #[test]
    fn test_wrong_shape_is_error() {
        assert!(ConfigPatch::from_str(r#"{"Matcher": 5}"#).is_err());
        assert!(ConfigPatch::from_str(r#"{"Style": {"Basic": "red"}}"#).is_err());
        assert!(ConfigPatch::from_str(r#"{"Action": {"a": "b"}}"#).is_err());
        assert!(ConfigPatch::from_str(r#"["Prompt"]"#).is_err());
    }

    #[test]
    fn test_serialization_uses_file_names() {
        let json = Config::default().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["Prompt"], "QUERY>");
        assert_eq!(value["Matcher"], "IgnoreCase");
        assert_eq!(
            value["Style"]["SavedSelection"],
            serde_json::json!(["black", "on_cyan", "bold"])
        );

        // What we print can be read back
        assert_eq!(decode_onto_default(&json), Config::default());
    }
}
