//! Model Registry
//!
//! Holds the binary model, the multiclass model and the label encoder loaded
//! from an artifact directory. Shared read-mostly (wrap in `Arc`); each slot
//! records why it is empty when loading failed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::classifier::TrainedModel;
use crate::constants::{BEST_MODELS_DIR, BINARY_MODEL_FILE, LABEL_ENCODER_FILE, MULTICLASS_MODEL_FILE};
use crate::error::{Result, RockfallError};
use crate::logic::scoring::LabelEncoder;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    BinaryModel,
    MulticlassModel,
    LabelEncoder,
}

impl ArtifactKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::BinaryModel => BINARY_MODEL_FILE,
            ArtifactKind::MulticlassModel => MULTICLASS_MODEL_FILE,
            ArtifactKind::LabelEncoder => LABEL_ENCODER_FILE,
        }
    }
}

/// Provenance of a loaded artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub sha256: String,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum ArtifactState<T> {
    NotLoaded { reason: String },
    Loaded { artifact: Arc<T>, info: ArtifactInfo },
}

impl<T> ArtifactState<T> {
    fn not_loaded(reason: impl Into<String>) -> Self {
        ArtifactState::NotLoaded { reason: reason.into() }
    }

    pub fn artifact(&self) -> Option<Arc<T>> {
        match self {
            ArtifactState::Loaded { artifact, .. } => Some(Arc::clone(artifact)),
            ArtifactState::NotLoaded { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ArtifactState::Loaded { .. })
    }

    fn status(&self) -> SlotStatus {
        match self {
            ArtifactState::Loaded { info, .. } => SlotStatus {
                loaded: true,
                path: Some(info.path.display().to_string()),
                sha256: Some(info.sha256.clone()),
                loaded_at: Some(info.loaded_at),
                reason: None,
            },
            ArtifactState::NotLoaded { reason } => SlotStatus {
                loaded: false,
                path: None,
                sha256: None,
                loaded_at: None,
                reason: Some(reason.clone()),
            },
        }
    }
}

/// Slot summary for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotStatus {
    pub loaded: bool,
    pub path: Option<String>,
    pub sha256: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStatus {
    pub binary_model: SlotStatus,
    pub multiclass_model: SlotStatus,
    pub label_encoder: SlotStatus,
}

// ============================================================================
// REGISTRY
// ============================================================================

pub struct ModelRegistry {
    binary: RwLock<ArtifactState<TrainedModel>>,
    multiclass: RwLock<ArtifactState<TrainedModel>>,
    label_encoder: RwLock<ArtifactState<LabelEncoder>>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            binary: RwLock::new(ArtifactState::not_loaded("not initialised")),
            multiclass: RwLock::new(ArtifactState::not_loaded("not initialised")),
            label_encoder: RwLock::new(ArtifactState::not_loaded("not initialised")),
        }
    }

    /// Registry initialised from `dir`; missing artifacts leave their slot empty
    pub fn load_from_dir(dir: &Path) -> Self {
        let registry = Self::new();
        registry.reload(dir);
        registry
    }

    /// (Re)load every artifact found under `dir`
    pub fn reload(&self, dir: &Path) -> RegistryStatus {
        log::info!("Loading model artifacts from {}", dir.display());

        *self.binary.write() = load_slot(dir, ArtifactKind::BinaryModel, |model: &TrainedModel| {
            model.layout.validate()?;
            if model.n_classes() != 2 {
                return Err(RockfallError::Model(format!(
                    "binary model has {} classes",
                    model.n_classes()
                )));
            }
            Ok(())
        });
        *self.multiclass.write() = load_slot(dir, ArtifactKind::MulticlassModel, |model: &TrainedModel| {
            model.layout.validate()
        });
        *self.label_encoder.write() = load_slot(dir, ArtifactKind::LabelEncoder, |_: &LabelEncoder| Ok(()));

        self.status()
    }

    /// Teardown: drop all artifacts
    pub fn unload(&self) {
        *self.binary.write() = ArtifactState::not_loaded("unloaded");
        *self.multiclass.write() = ArtifactState::not_loaded("unloaded");
        *self.label_encoder.write() = ArtifactState::not_loaded("unloaded");
        log::info!("Model artifacts unloaded");
    }

    /// Install an in-memory binary model (freshly trained or for tests)
    pub fn install_binary(&self, model: TrainedModel) -> Result<()> {
        model.layout.validate()?;
        *self.binary.write() = in_memory(ArtifactKind::BinaryModel, model)?;
        Ok(())
    }

    pub fn install_multiclass(&self, model: TrainedModel) -> Result<()> {
        model.layout.validate()?;
        *self.multiclass.write() = in_memory(ArtifactKind::MulticlassModel, model)?;
        Ok(())
    }

    pub fn install_label_encoder(&self, encoder: LabelEncoder) -> Result<()> {
        *self.label_encoder.write() = in_memory(ArtifactKind::LabelEncoder, encoder)?;
        Ok(())
    }

    /// Binary model, or `MissingArtifact` with the slot's reason
    pub fn binary(&self) -> Result<Arc<TrainedModel>> {
        match &*self.binary.read() {
            ArtifactState::Loaded { artifact, .. } => Ok(Arc::clone(artifact)),
            ArtifactState::NotLoaded { reason } => Err(RockfallError::MissingArtifact(format!(
                "{}: {}",
                BINARY_MODEL_FILE, reason
            ))),
        }
    }

    pub fn multiclass(&self) -> Option<Arc<TrainedModel>> {
        self.multiclass.read().artifact()
    }

    pub fn label_encoder(&self) -> Option<Arc<LabelEncoder>> {
        self.label_encoder.read().artifact()
    }

    pub fn has_binary(&self) -> bool {
        self.binary.read().is_loaded()
    }

    pub fn has_multiclass(&self) -> bool {
        self.multiclass.read().is_loaded() && self.label_encoder.read().is_loaded()
    }

    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            binary_model: self.binary.read().status(),
            multiclass_model: self.multiclass.read().status(),
            label_encoder: self.label_encoder.read().status(),
        }
    }
}

// ============================================================================
// ARTIFACT STORE
// ============================================================================

/// `<dir>/best_models/<file>` if present, else `<dir>/<file>`
pub fn resolve_artifact_path(dir: &Path, file_name: &str) -> Option<PathBuf> {
    [dir.join(BEST_MODELS_DIR).join(file_name), dir.join(file_name)]
        .into_iter()
        .find(|p| p.is_file())
}

/// Write an artifact as pretty JSON, creating parent directories
pub fn save_artifact<T: Serialize>(dir: &Path, kind: ArtifactKind, artifact: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(kind.file_name());
    let json = serde_json::to_vec_pretty(artifact)?;
    fs::write(&path, json)?;
    log::info!("Saved {:?} to {}", kind, path.display());
    Ok(path)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn read_artifact<T: DeserializeOwned>(dir: &Path, kind: ArtifactKind) -> Result<(T, ArtifactInfo)> {
    let path = resolve_artifact_path(dir, kind.file_name()).ok_or_else(|| {
        RockfallError::MissingArtifact(format!("{} not found under {}", kind.file_name(), dir.display()))
    })?;

    let bytes = fs::read(&path)?;
    let artifact = serde_json::from_slice(&bytes)?;
    let info = ArtifactInfo {
        kind,
        sha256: sha256_hex(&bytes),
        path,
        loaded_at: Utc::now(),
    };
    Ok((artifact, info))
}

fn load_slot<T, F>(dir: &Path, kind: ArtifactKind, check: F) -> ArtifactState<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<()>,
{
    let loaded = read_artifact::<T>(dir, kind).and_then(|(artifact, info)| {
        check(&artifact)?;
        Ok((artifact, info))
    });

    match loaded {
        Ok((artifact, info)) => {
            log::info!("Loaded {:?} from {} (sha256 {})", kind, info.path.display(), &info.sha256[..12]);
            ArtifactState::Loaded { artifact: Arc::new(artifact), info }
        }
        Err(e) => {
            log::warn!("{:?} not loaded: {}", kind, e);
            ArtifactState::not_loaded(e.to_string())
        }
    }
}

fn in_memory<T: Serialize>(kind: ArtifactKind, artifact: T) -> Result<ArtifactState<T>> {
    let bytes = serde_json::to_vec(&artifact)?;
    Ok(ArtifactState::Loaded {
        info: ArtifactInfo {
            kind,
            path: PathBuf::from("<memory>"),
            sha256: sha256_hex(&bytes),
            loaded_at: Utc::now(),
        },
        artifact: Arc::new(artifact),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{LayoutStamp, FEATURE_COUNT};
    use crate::logic::model::ClassifierKind;
    use ndarray::Array2;

    fn tiny_model(n_classes: usize) -> TrainedModel {
        let mut x = Array2::zeros((12, FEATURE_COUNT));
        let mut y = Vec::new();
        for i in 0..12 {
            x[[i, 0]] = i as f64;
            y.push(i % n_classes);
        }
        TrainedModel::train(ClassifierKind::Knn, &x, &y, n_classes, 0).unwrap()
    }

    #[test]
    fn test_empty_dir_leaves_slots_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::load_from_dir(dir.path());

        assert!(matches!(registry.binary(), Err(RockfallError::MissingArtifact(_))));
        assert!(registry.multiclass().is_none());
        assert!(!registry.status().binary_model.loaded);
        assert!(registry.status().label_encoder.reason.is_some());
    }

    #[test]
    fn test_prefers_best_models_subdir() {
        let dir = tempfile::tempdir().unwrap();
        let best = dir.path().join(BEST_MODELS_DIR);
        save_artifact(dir.path(), ArtifactKind::BinaryModel, &tiny_model(2)).unwrap();
        save_artifact(&best, ArtifactKind::BinaryModel, &tiny_model(2)).unwrap();

        let resolved = resolve_artifact_path(dir.path(), BINARY_MODEL_FILE).unwrap();
        assert!(resolved.starts_with(&best));

        let registry = ModelRegistry::load_from_dir(dir.path());
        let status = registry.status().binary_model;
        assert!(status.loaded);
        assert_eq!(status.sha256.unwrap().len(), 64);
    }

    #[test]
    fn test_rejects_layout_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = tiny_model(2);
        model.layout = LayoutStamp { version: model.layout.version + 1, hash: model.layout.hash };
        save_artifact(dir.path(), ArtifactKind::BinaryModel, &model).unwrap();

        let registry = ModelRegistry::load_from_dir(dir.path());
        assert!(registry.binary().is_err());
        let reason = registry.status().binary_model.reason.unwrap();
        assert!(reason.contains("ayout"), "reason was {}", reason);
    }

    #[test]
    fn test_rejects_multiclass_model_in_binary_slot() {
        let dir = tempfile::tempdir().unwrap();
        save_artifact(dir.path(), ArtifactKind::BinaryModel, &tiny_model(3)).unwrap();
        let registry = ModelRegistry::load_from_dir(dir.path());
        assert!(!registry.has_binary());
    }

    #[test]
    fn test_unload_clears_slots() {
        let registry = ModelRegistry::new();
        registry.install_binary(tiny_model(2)).unwrap();
        registry.install_label_encoder(LabelEncoder::standard()).unwrap();
        assert!(registry.has_binary());

        registry.unload();
        assert!(!registry.has_binary());
        assert!(registry.label_encoder().is_none());
    }
}
