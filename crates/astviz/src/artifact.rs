//! On-disk storage of rendered images.
//!
//! Rendering writes into a [`StagedArtifact`], a temporary file inside the
//! artifact directory. Only [`ArtifactStore::commit`] gives it its public
//! `ast_<hex>.png` name; a staged artifact that is dropped instead is
//! deleted, so failed or over-budget runs leave nothing behind.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::error::AstvizError;

const FILE_PREFIX: &str = "ast_";
const FILE_EXTENSION: &str = "png";
const STAGING_PREFIX: &str = ".staged_";

/// Directory of rendered images and the public path it is served under.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    public_prefix: String,
}

/// A rendered image that is not yet published.
#[derive(Debug)]
pub struct StagedArtifact {
    file: NamedTempFile,
}

impl StagedArtifact {
    /// Path the renderer writes to.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// A published image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    name: String,
    path: PathBuf,
    public_path: String,
}

impl Artifact {
    /// File name, `ast_<hex>.png`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relative URL path, e.g. `static/images/ast_storage/ast_<hex>.png`.
    pub fn public_path(&self) -> &str {
        &self.public_path
    }
}

impl ArtifactStore {
    /// Opens the store, creating `dir` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        debug!(dir = dir.display().to_string(), public_prefix; "Opened artifact store");
        Ok(Self { dir, public_prefix })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates an empty staged file inside the store directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn stage(&self) -> io::Result<StagedArtifact> {
        let file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(&format!(".{FILE_EXTENSION}"))
            .tempfile_in(&self.dir)?;
        Ok(StagedArtifact { file })
    }

    /// Publishes a staged image under a fresh random name.
    ///
    /// # Errors
    ///
    /// - [`AstvizError::MissingArtifact`] if the renderer left the staged
    ///   file empty, or the published file is absent afterwards.
    /// - [`AstvizError::Io`] if the file cannot be moved into place.
    pub fn commit(&self, staged: StagedArtifact) -> Result<Artifact, AstvizError> {
        let size = fs::metadata(staged.path())?.len();
        if size == 0 {
            return Err(AstvizError::MissingArtifact(staged.path().to_path_buf()));
        }

        let name = fresh_name();
        let path = self.dir.join(&name);
        staged
            .file
            .persist_noclobber(&path)
            .map_err(|err| AstvizError::Io(err.error))?;

        if !path.is_file() {
            return Err(AstvizError::MissingArtifact(path));
        }

        let public_path = if self.public_prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{name}", self.public_prefix)
        };

        info!(name, size; "Stored AST image");
        Ok(Artifact {
            name,
            path,
            public_path,
        })
    }
}

fn fresh_name() -> String {
    format!("{FILE_PREFIX}{:032x}.{FILE_EXTENSION}", rand::random::<u128>())
}
