/// Configuration loading and validation for hashtag completion
use crate::error::{ConfigError, ConfigResult};
use crate::position::PlacementOffsets;
use hashtag_keybinds::KeyCombo;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_TRIGGER_CHAR: char = '#';
pub const DEFAULT_MAX_CHARS: usize = 31;
pub const DEFAULT_OFFSET_TOP: f64 = 2.0;

/// Serializable completion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashtagConfig {
    /// Character that opens a completion context
    pub trigger_char: char,
    /// Pattern every query character must match; `None` allows any character
    pub allowed_chars: Option<String>,
    /// Minimum query length before candidates are requested
    pub min_chars: usize,
    /// Length of the text window scanned backwards from the caret
    pub max_chars: usize,
    /// Vertical gap between the trigger and the panel
    pub offset_top: f64,
    /// Horizontal shift of the panel from the trigger
    pub offset_left: f64,
    pub keys: KeyConfig,
}

impl Default for HashtagConfig {
    fn default() -> Self {
        Self {
            trigger_char: DEFAULT_TRIGGER_CHAR,
            allowed_chars: None,
            min_chars: 0,
            max_chars: DEFAULT_MAX_CHARS,
            offset_top: DEFAULT_OFFSET_TOP,
            offset_left: 0.0,
            keys: KeyConfig::default(),
        }
    }
}

impl HashtagConfig {
    /// Validate and compile the configuration
    pub fn compile(&self) -> ConfigResult<CompiledConfig> {
        ConfigLoader::compile(self)
    }
}

/// Keys the suggestion list claims while it is open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub select: Vec<String>,
    pub dismiss: Vec<String>,
    pub previous: Vec<String>,
    pub next: Vec<String>,
    pub space: Vec<String>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            select: vec!["Tab".to_string(), "Enter".to_string()],
            dismiss: vec!["Escape".to_string()],
            previous: vec!["Up".to_string()],
            next: vec!["Down".to_string()],
            space: vec!["Space".to_string()],
        }
    }
}

/// Parsed key combinations from a [`KeyConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledKeys {
    pub select: Vec<KeyCombo>,
    pub dismiss: Vec<KeyCombo>,
    pub previous: Vec<KeyCombo>,
    pub next: Vec<KeyCombo>,
    pub space: Vec<KeyCombo>,
}

impl KeyConfig {
    fn compile(&self) -> ConfigResult<CompiledKeys> {
        fn parse(keys: &[String]) -> ConfigResult<Vec<KeyCombo>> {
            keys.iter()
                .map(|key| KeyCombo::from_str(key).map_err(ConfigError::from))
                .collect()
        }

        Ok(CompiledKeys {
            select: parse(&self.select)?,
            dismiss: parse(&self.dismiss)?,
            previous: parse(&self.previous)?,
            next: parse(&self.next)?,
            space: parse(&self.space)?,
        })
    }
}

/// Validated configuration ready for use by a session
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub trigger_char: char,
    pub allowed_chars: Option<Regex>,
    pub min_chars: usize,
    pub max_chars: usize,
    pub offsets: PlacementOffsets,
    pub keys: CompiledKeys,
}

impl Default for CompiledConfig {
    fn default() -> Self {
        Self {
            trigger_char: DEFAULT_TRIGGER_CHAR,
            allowed_chars: None,
            min_chars: 0,
            max_chars: DEFAULT_MAX_CHARS,
            offsets: PlacementOffsets {
                top: DEFAULT_OFFSET_TOP,
                left: 0.0,
            },
            keys: CompiledKeys {
                select: vec![
                    KeyCombo::plain(hashtag_keybinds::Key::Tab),
                    KeyCombo::plain(hashtag_keybinds::Key::Enter),
                ],
                dismiss: vec![KeyCombo::plain(hashtag_keybinds::Key::Escape)],
                previous: vec![KeyCombo::plain(hashtag_keybinds::Key::Up)],
                next: vec![KeyCombo::plain(hashtag_keybinds::Key::Down)],
                space: vec![KeyCombo::plain(hashtag_keybinds::Key::SPACE)],
            },
        }
    }
}

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }
}

/// Completion configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn load_from_yaml(path: &Path) -> ConfigResult<HashtagConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, ConfigFormat::Yaml)
    }

    /// Load configuration from a JSON file
    pub fn load_from_json(path: &Path) -> ConfigResult<HashtagConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, ConfigFormat::Json)
    }

    /// Load configuration from a file, choosing the format by extension
    pub fn load_from_path(path: &Path) -> ConfigResult<HashtagConfig> {
        match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Yaml) => Self::load_from_yaml(path),
            Some(ConfigFormat::Json) => Self::load_from_json(path),
            None => Err(ConfigError::Invalid(format!(
                "Unsupported configuration file: {}",
                path.display()
            ))),
        }
    }

    /// Load configuration from a string
    pub fn load_from_string(content: &str, format: ConfigFormat) -> ConfigResult<HashtagConfig> {
        let config: HashtagConfig = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Validate configuration bounds and patterns
    pub fn validate_config(config: &HashtagConfig) -> ConfigResult<()> {
        Self::compile(config).map(|_| ())
    }

    /// Validate a configuration and compile its pattern and keys
    pub fn compile(config: &HashtagConfig) -> ConfigResult<CompiledConfig> {
        if config.trigger_char.is_whitespace() || config.trigger_char.is_control() {
            return Err(ConfigError::InvalidTrigger(config.trigger_char));
        }

        if config.max_chars == 0 {
            return Err(ConfigError::ZeroMaxChars);
        }

        if config.min_chars > config.max_chars {
            return Err(ConfigError::InvalidLengthBounds {
                min: config.min_chars,
                max: config.max_chars,
            });
        }

        if !config.offset_top.is_finite() || !config.offset_left.is_finite() {
            return Err(ConfigError::Invalid(
                "Panel offsets must be finite".to_string(),
            ));
        }

        let allowed_chars = config
            .allowed_chars
            .as_deref()
            .map(Regex::new)
            .transpose()?;

        Ok(CompiledConfig {
            trigger_char: config.trigger_char,
            allowed_chars,
            min_chars: config.min_chars,
            max_chars: config.max_chars,
            offsets: PlacementOffsets {
                top: config.offset_top,
                left: config.offset_left,
            },
            keys: config.keys.compile()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = HashtagConfig::default();
        assert_eq!(config.trigger_char, '#');
        assert_eq!(config.min_chars, 0);
        assert_eq!(config.max_chars, 31);
        assert_eq!(config.offset_top, 2.0);
        assert_eq!(config.offset_left, 0.0);
        assert!(config.allowed_chars.is_none());
    }

    #[test]
    fn test_compiled_default_matches_compiled_config_default() {
        let compiled = HashtagConfig::default().compile().unwrap();
        let direct = CompiledConfig::default();
        assert_eq!(compiled.keys, direct.keys);
        assert_eq!(compiled.offsets, direct.offsets);
        assert_eq!(compiled.max_chars, direct.max_chars);
    }

    #[test]
    fn test_validate_min_exceeds_max() {
        let config = HashtagConfig {
            min_chars: 5,
            max_chars: 3,
            ..HashtagConfig::default()
        };
        assert!(matches!(
            ConfigLoader::validate_config(&config),
            Err(ConfigError::InvalidLengthBounds { min: 5, max: 3 })
        ));
    }

    #[test]
    fn test_validate_zero_max() {
        let config = HashtagConfig {
            max_chars: 0,
            ..HashtagConfig::default()
        };
        assert!(matches!(
            ConfigLoader::validate_config(&config),
            Err(ConfigError::ZeroMaxChars)
        ));
    }

    #[test]
    fn test_validate_whitespace_trigger() {
        let config = HashtagConfig {
            trigger_char: ' ',
            ..HashtagConfig::default()
        };
        assert!(matches!(
            ConfigLoader::validate_config(&config),
            Err(ConfigError::InvalidTrigger(' '))
        ));
    }

    #[test]
    fn test_validate_bad_pattern() {
        let config = HashtagConfig {
            allowed_chars: Some("[a-z".to_string()),
            ..HashtagConfig::default()
        };
        assert!(matches!(
            ConfigLoader::validate_config(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_validate_bad_key() {
        let mut config = HashtagConfig::default();
        config.keys.select = vec!["Hyper+Tab".to_string()];
        assert!(matches!(
            ConfigLoader::validate_config(&config),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_load_partial_yaml_keeps_defaults() {
        let yaml = "trigger_char: '@'\nmin_chars: 1\nallowed_chars: '[A-Za-z0-9_]'\n";
        let config = ConfigLoader::load_from_string(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.trigger_char, '@');
        assert_eq!(config.min_chars, 1);
        assert_eq!(config.max_chars, 31);
        assert_eq!(config.keys, KeyConfig::default());
    }

    #[test]
    fn test_load_json_keys() {
        let json = r#"{"keys": {"select": ["Ctrl+Enter"]}}"#;
        let config = ConfigLoader::load_from_string(json, ConfigFormat::Json).unwrap();
        let compiled = config.compile().unwrap();
        assert_eq!(compiled.keys.select.len(), 1);
        assert_eq!(compiled.keys.select[0].to_string(), "Ctrl+Enter");
        assert_eq!(compiled.keys.dismiss.len(), 1);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("hashtag.yml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("hashtag.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("hashtag.toml")), None);
    }
}
