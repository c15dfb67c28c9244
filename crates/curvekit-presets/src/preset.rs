//! Preset documents as stored on disk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PresetError;
use crate::timestamp::Timestamp;

/// Format version written into every saved preset.
pub const PRESET_VERSION: &str = "1.0";

/// Preset ids double as file stems, so only `[A-Za-z0-9_-]` is accepted.
pub fn validate_id(id: &str) -> Result<(), PresetError> {
    let ok = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok { Ok(()) } else { Err(PresetError::InvalidId(id.to_string())) }
}

/// Where a preset lives. Defaults ship with the plugin and are read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKind {
    Default,
    #[default]
    User,
    Shared,
}

impl PresetKind {
    /// Search order for lookups by id.
    pub const ALL: [Self; 3] = [Self::Default, Self::User, Self::Shared];

    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::User => "user",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for PresetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "user" => Ok(Self::User),
            "shared" => Ok(Self::Shared),
            other => Err(format!("unknown preset kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetMetadata {
    pub tags: Vec<String>,
    /// Data URL or empty.
    pub thumbnail: String,
}

/// One saved parameter set for a node type.
///
/// `parameters` is the node's config as JSON; the store does not interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub created_at: Timestamp,
    pub author: String,
    pub version: String,
    pub node_type: String,
    pub parameters: serde_json::Value,
    pub metadata: PresetMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<Timestamp>,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Untitled Preset".to_string(),
            description: String::new(),
            category: "custom".to_string(),
            created_at: Timestamp::default(),
            author: "Anonymous".to_string(),
            version: PRESET_VERSION.to_string(),
            node_type: String::new(),
            parameters: serde_json::Value::Object(serde_json::Map::new()),
            metadata: PresetMetadata::default(),
            exported_at: None,
            exported_from: None,
            imported_at: None,
        }
    }
}

impl Preset {
    /// New preset for `node_type` holding `parameters`.
    pub fn new(name: impl Into<String>, node_type: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            parameters,
            ..Default::default()
        }
    }

    /// Deserialize the parameters into a node config.
    pub fn parameters_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, PresetError> {
        Ok(serde_json::from_value(self.parameters.clone())?)
    }

    /// Suggested download file name, `<Name_With_Underscores>_<node>_preset.json`.
    pub fn export_file_name(&self) -> String {
        format!("{}_{}_preset.json", self.name.replace(' ', "_"), self.node_type)
    }
}
