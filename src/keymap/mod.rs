pub mod index;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LoadError;

/// Number of dense key indices a keymap can describe
pub const KEY_COUNT: usize = 100;
/// Number of remap layers per key
pub const LAYER_COUNT: usize = 6;
/// Usage value marking a (key, layer) slot without a mapping
pub const UNMAPPED: u8 = 0x00;

/// Keymap shipped with the package, used when no other keymap is configured
const BUILTIN_KEYMAP: &str = include_str!("../../rootfs/usr/share/bluehid/keymaps/neo2_de_apple.yaml");

/// Possible errors validating a keymap
#[derive(Debug, Error)]
pub enum KeyMapError {
    #[error("Failed to load keymap: {0}")]
    Load(#[from] LoadError),
    #[error("Unexpected keymap kind: {0}")]
    InvalidKind(String),
    #[error("Key index {0} is out of range")]
    IndexOutOfRange(usize),
    #[error("Key index {0} is defined more than once")]
    DuplicateIndex(u8),
    #[error("Key code {0} is mapped more than once")]
    DuplicateKeyCode(u16),
    #[error("Key index {index} defines {count} layers")]
    TooManyLayers { index: u8, count: usize },
}

/// A single remapped output: the modifier byte and key usage to report
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "[u8; 2]", into = "[u8; 2]")]
pub struct KeyMapEntry {
    pub modifier: u8,
    pub usage: u8,
}

impl KeyMapEntry {
    pub fn new(modifier: u8, usage: u8) -> Self {
        Self { modifier, usage }
    }

    pub fn is_mapped(&self) -> bool {
        self.usage != UNMAPPED
    }
}

impl From<[u8; 2]> for KeyMapEntry {
    fn from(value: [u8; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<KeyMapEntry> for [u8; 2] {
    fn from(value: KeyMapEntry) -> Self {
        [value.modifier, value.usage]
    }
}

/// Keymap definition as stored on disk
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct KeyMap {
    pub version: u32,
    pub kind: String,
    pub name: String,
    pub description: Option<String>,
    pub keys: Vec<KeyMapping>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct KeyMapping {
    pub index: u8,
    pub name: Option<String>,
    pub layers: Vec<KeyMapEntry>,
}

impl KeyMap {
    /// Load a [KeyMap] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<KeyMap, LoadError> {
        let keymap: KeyMap = serde_yaml::from_str(content)?;
        Ok(keymap)
    }

    /// Load a [KeyMap] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<KeyMap, LoadError> {
        let file = std::fs::File::open(path)?;
        let keymap: KeyMap = serde_yaml::from_reader(file)?;
        Ok(keymap)
    }
}

/// Validated, immutable lookup of (dense index, layer) to output.
#[derive(Debug, Clone)]
pub struct KeyMapTable {
    name: String,
    entries: Box<[[KeyMapEntry; LAYER_COUNT]; KEY_COUNT]>,
}

impl KeyMapTable {
    /// Build a table from a keymap definition. Keys and layers the keymap
    /// does not mention are left unmapped.
    pub fn from_keymap(keymap: &KeyMap) -> Result<Self, KeyMapError> {
        if keymap.kind != "KeyMap" {
            return Err(KeyMapError::InvalidKind(keymap.kind.clone()));
        }

        let mut entries = Box::new([[KeyMapEntry::default(); LAYER_COUNT]; KEY_COUNT]);
        let mut seen = HashSet::new();
        for key in keymap.keys.iter() {
            let index = key.index as usize;
            if index >= KEY_COUNT {
                return Err(KeyMapError::IndexOutOfRange(index));
            }
            if !seen.insert(key.index) {
                return Err(KeyMapError::DuplicateIndex(key.index));
            }
            if key.layers.len() > LAYER_COUNT {
                return Err(KeyMapError::TooManyLayers {
                    index: key.index,
                    count: key.layers.len(),
                });
            }
            for (layer, entry) in key.layers.iter().enumerate() {
                entries[index][layer] = *entry;
            }
        }

        log::debug!(
            "Loaded keymap '{}' with {} mapped keys",
            keymap.name,
            keymap.keys.len()
        );
        Ok(Self {
            name: keymap.name.clone(),
            entries,
        })
    }

    /// The keymap compiled into the binary
    pub fn builtin() -> Result<Self, KeyMapError> {
        let keymap = KeyMap::from_yaml(BUILTIN_KEYMAP)?;
        Self::from_keymap(&keymap)
    }

    /// Load and validate a keymap file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, KeyMapError> {
        let keymap = KeyMap::from_yaml_file(path)?;
        Self::from_keymap(&keymap)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the output for the given key and layer, or [None] if that
    /// slot is unmapped.
    pub fn lookup(&self, index: u8, layer: usize) -> Option<KeyMapEntry> {
        let entry = self.entries.get(index as usize)?.get(layer)?;
        entry.is_mapped().then_some(*entry)
    }
}
