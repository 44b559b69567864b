//! Artifact files on disk.
//!
//! Each artifact is stored under a stem name as either `<stem>.json`
//! (serde_json) or `<stem>.bin` (bincode). JSON takes precedence when both
//! exist.

use crate::error::{ModelError, ModelResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Json => "json",
            ArtifactFormat::Bincode => "bin",
        }
    }
}

/// Resolve `<dir>/<stem>.json` or `<dir>/<stem>.bin`.
pub fn locate_artifact(dir: &Path, stem: &str) -> Option<(PathBuf, ArtifactFormat)> {
    [ArtifactFormat::Json, ArtifactFormat::Bincode]
        .into_iter()
        .map(|format| (dir.join(format!("{}.{}", stem, format.extension())), format))
        .find(|(path, _)| path.is_file())
}

pub fn artifact_exists(dir: &Path, stem: &str) -> bool {
    locate_artifact(dir, stem).is_some()
}

/// Load a required artifact. Absence is an error.
pub fn load_artifact<T: DeserializeOwned>(dir: &Path, stem: &str) -> ModelResult<T> {
    let (path, format) = locate_artifact(dir, stem)
        .ok_or_else(|| ModelError::MissingArtifact(dir.join(stem)))?;

    let reader = BufReader::new(File::open(&path)?);
    let value = match format {
        ArtifactFormat::Json => serde_json::from_reader(reader).map_err(|e| ModelError::Load {
            path: path.clone(),
            message: e.to_string(),
        })?,
        ArtifactFormat::Bincode => {
            bincode::deserialize_from(reader).map_err(|e| ModelError::Load {
                path: path.clone(),
                message: e.to_string(),
            })?
        }
    };
    debug!(path = %path.display(), "Loaded artifact");
    Ok(value)
}

/// Load an artifact that may legitimately be absent.
pub fn load_optional_artifact<T: DeserializeOwned>(dir: &Path, stem: &str) -> ModelResult<Option<T>> {
    if artifact_exists(dir, stem) {
        load_artifact(dir, stem).map(Some)
    } else {
        Ok(None)
    }
}

/// Write an artifact; used by the export tooling and fixtures.
pub fn save_artifact<T: Serialize>(
    dir: &Path,
    stem: &str,
    value: &T,
    format: ArtifactFormat,
) -> ModelResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    let temp = path.with_extension("tmp");
    {
        let mut writer = BufWriter::new(File::create(&temp)?);
        match format {
            ArtifactFormat::Json => serde_json::to_writer(&mut writer, value)
                .map_err(|e| ModelError::Invalid(e.to_string()))?,
            ArtifactFormat::Bincode => bincode::serialize_into(&mut writer, value)
                .map_err(|e| ModelError::Invalid(e.to_string()))?,
        }
        writer.flush()?;
    }
    std::fs::rename(&temp, &path)?;
    Ok(path)
}
