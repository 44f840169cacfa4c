//! Ambient track selection.

use std::path::PathBuf;
use tomo_core::config::AmbientConfig;
use tomo_core::AmbientTrack;

/// Maps target emotions onto looping assets in a directory.
#[derive(Debug, Clone)]
pub struct AmbientLibrary {
    asset_dir: PathBuf,
    extension: String,
    fallback: String,
}

impl AmbientLibrary {
    pub fn new(
        asset_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
            fallback: fallback.into(),
        }
    }

    /// `None` when ambient audio is disabled in config.
    pub fn from_config(config: &AmbientConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(&config.asset_dir, &config.extension, &config.fallback))
    }

    fn path_for(&self, emotion: &str) -> PathBuf {
        self.asset_dir.join(format!("{}.{}", emotion, self.extension))
    }

    /// The asset for `target_emotion`, else the fallback asset, else `None`.
    pub fn resolve(&self, target_emotion: &str) -> Option<AmbientTrack> {
        let emotion = target_emotion.trim().to_lowercase();
        for candidate in [emotion.as_str(), self.fallback.as_str()] {
            if candidate.is_empty() || candidate.contains(['/', '\\', '.']) {
                continue;
            }
            let path = self.path_for(candidate);
            if path.is_file() {
                if candidate != emotion {
                    tracing::debug!("No ambient track for '{}', using '{}'", emotion, candidate);
                }
                return Some(AmbientTrack {
                    emotion: candidate.to_string(),
                    path,
                });
            }
        }
        tracing::warn!(
            "No ambient track for '{}' in {}",
            emotion,
            self.asset_dir.display()
        );
        None
    }
}
