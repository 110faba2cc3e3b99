//! Model artifact persistence: LightGBM's native serialization format, with
//! latest-by-mtime resolution when no explicit path is given.

use std::path::{Path, PathBuf};

use lightgbm::Booster;

use shutuba::file::latest_by_mtime;

pub const MODEL_FILE_EXTENSION: &str = "lgbm";

pub struct ModelArtifact;

impl ModelArtifact {
    pub fn save(model: &Booster, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path_str = path.as_ref().to_str().expect("model path must be valid UTF-8");
        model.save_file(path_str)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Booster> {
        let path_str = path.as_ref().to_str().expect("model path must be valid UTF-8");
        Ok(Booster::from_file(path_str)?)
    }

    /// Resolves the most recently modified model file in `dir`, if any.
    pub fn latest_in(dir: impl AsRef<Path>) -> std::io::Result<Option<PathBuf>> {
        latest_by_mtime(dir, |path| {
            path.extension().and_then(|ext| ext.to_str()) == Some(MODEL_FILE_EXTENSION)
        })
    }
}
