//! Directory-backed preset storage for one node type.
//!
//! ```text
//! <root>/<node_type>/default/<id>.json   shipped, read-only
//! <root>/<node_type>/user/<id>.json
//! <root>/<node_type>/shared/<id>.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PresetError;
use crate::preset::{PRESET_VERSION, Preset, PresetKind, validate_id};
use crate::timestamp::Timestamp;

/// A preset read back from disk, with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPreset {
    pub kind: PresetKind,
    pub file_name: String,
    pub preset: Preset,
}

#[derive(Debug, Clone)]
pub struct PresetStore {
    node_type: String,
    dir: PathBuf,
}

impl PresetStore {
    /// Open the store for `node_type` under `root`, creating its directories.
    pub fn open(root: impl AsRef<Path>, node_type: impl Into<String>) -> Result<Self, PresetError> {
        let node_type = node_type.into();
        validate_id(&node_type)?;
        let store = Self {
            dir: root.as_ref().join(&node_type),
            node_type,
        };
        for kind in PresetKind::ALL {
            let path = store.kind_dir(kind);
            fs::create_dir_all(&path).map_err(PresetError::io(&path))?;
        }
        Ok(store)
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn kind_dir(&self, kind: PresetKind) -> PathBuf {
        self.dir.join(kind.dir_name())
    }

    fn path_for(&self, kind: PresetKind, id: &str) -> PathBuf {
        self.kind_dir(kind).join(format!("{id}.json"))
    }

    fn write(&self, kind: PresetKind, preset: &Preset) -> Result<PathBuf, PresetError> {
        validate_id(&preset.id)?;
        let path = self.path_for(kind, &preset.id);
        let payload = serde_json::to_string_pretty(preset)?;
        fs::write(&path, payload).map_err(PresetError::io(&path))?;
        Ok(path)
    }

    fn read(path: &Path) -> Result<Preset, PresetError> {
        let contents = fs::read_to_string(path).map_err(PresetError::io(path))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save into `user/` or `shared/`. Stamps the creation time, format
    /// version and node type; an existing preset with the same id is replaced.
    pub fn save(&self, mut preset: Preset, kind: PresetKind) -> Result<String, PresetError> {
        if kind == PresetKind::Default {
            return Err(PresetError::ReadOnly(preset.id));
        }
        preset.created_at = Timestamp::now();
        preset.version = PRESET_VERSION.to_string();
        preset.node_type = self.node_type.clone();
        let path = self.write(kind, &preset)?;
        tracing::info!(id = %preset.id, path = %path.display(), "preset saved");
        Ok(preset.id)
    }

    /// Install a shipped preset into `default/` exactly as given.
    pub fn install_default(&self, preset: &Preset) -> Result<(), PresetError> {
        if preset.node_type != self.node_type {
            return Err(PresetError::NodeTypeMismatch {
                expected: self.node_type.clone(),
                found: preset.node_type.clone(),
            });
        }
        self.write(PresetKind::Default, preset)?;
        Ok(())
    }

    /// Every readable preset, newest first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<StoredPreset>, PresetError> {
        let mut presets = Vec::new();
        for kind in PresetKind::ALL {
            let dir = self.kind_dir(kind);
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(PresetError::io(&dir)(err)),
            };
            for entry in entries {
                let path = entry.map_err(PresetError::io(&dir))?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                match Self::read(&path) {
                    Ok(preset) => presets.push(StoredPreset {
                        kind,
                        file_name: path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        preset,
                    }),
                    Err(err) => tracing::warn!(path = %path.display(), "skipping unreadable preset: {err}"),
                }
            }
        }
        presets.sort_by(|a, b| b.preset.created_at.cmp(&a.preset.created_at));
        Ok(presets)
    }

    /// Find `id` in default, user and shared, in that order.
    pub fn find(&self, id: &str) -> Result<(PresetKind, PathBuf), PresetError> {
        validate_id(id)?;
        PresetKind::ALL
            .into_iter()
            .map(|kind| (kind, self.path_for(kind, id)))
            .find(|(_, path)| path.is_file())
            .ok_or_else(|| PresetError::NotFound(id.to_string()))
    }

    pub fn load(&self, id: &str) -> Result<Preset, PresetError> {
        let (_, path) = self.find(id)?;
        Self::read(&path)
    }

    /// Delete a user or shared preset. Defaults cannot be deleted.
    pub fn delete(&self, id: &str) -> Result<(), PresetError> {
        let (kind, path) = self.find(id)?;
        if kind == PresetKind::Default {
            return Err(PresetError::ReadOnly(id.to_string()));
        }
        fs::remove_file(&path).map_err(PresetError::io(&path))?;
        tracing::info!(%id, %kind, "preset deleted");
        Ok(())
    }

    /// Copy of `id` stamped with export time and origin.
    pub fn export(&self, id: &str) -> Result<Preset, PresetError> {
        let mut preset = self.load(id)?;
        preset.exported_at = Some(Timestamp::now());
        preset.exported_from = Some(format!("curvekit-{}", self.node_type));
        Ok(preset)
    }

    /// Import an exported preset as a new user preset with a fresh id.
    pub fn import(&self, mut preset: Preset) -> Result<String, PresetError> {
        if preset.node_type != self.node_type {
            return Err(PresetError::NodeTypeMismatch {
                expected: self.node_type.clone(),
                found: preset.node_type,
            });
        }
        preset.id = uuid::Uuid::new_v4().to_string();
        preset.imported_at = Some(Timestamp::now());
        self.write(PresetKind::User, &preset)?;
        tracing::info!(id = %preset.id, "preset imported");
        Ok(preset.id)
    }

    /// [`import`](Self::import) from exported JSON text.
    pub fn import_json(&self, text: &str) -> Result<String, PresetError> {
        self.import(serde_json::from_str(text)?)
    }
}
