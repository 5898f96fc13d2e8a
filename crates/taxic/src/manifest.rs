//! `taxi.toml` project manifests.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const MANIFEST_FILE: &str = "taxi.toml";

/// Failure to locate or load a project's sources.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest: {0}")]
    Manifest(#[from] toml::de::Error),
    #[error("'{}' does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("no .taxi files found under '{}'", .0.display())]
    NoSources(PathBuf),
}

/// A parsed `taxi.toml`.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub project: ProjectConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    /// Directory holding the `.taxi` sources, relative to the manifest.
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub warnings_as_errors: bool,
}

fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Manifest, ProjectError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Manifest, ProjectError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_manifest() {
        let manifest = Manifest::parse(
            r#"
[project]
name = "trades"
version = "0.1.0"
source_root = "schemas"

[compiler]
warnings_as_errors = true
"#,
        )
        .unwrap();
        assert_eq!(manifest.project.name, "trades");
        assert_eq!(manifest.project.version, "0.1.0");
        assert_eq!(manifest.project.source_root, PathBuf::from("schemas"));
        assert!(manifest.compiler.warnings_as_errors);
    }

    #[test]
    fn defaults_apply() {
        let manifest = Manifest::parse("[project]\nname = \"x\"\nversion = \"1.0.0\"\n").unwrap();
        assert_eq!(manifest.project.source_root, PathBuf::from("src"));
        assert!(!manifest.compiler.warnings_as_errors);
    }

    #[test]
    fn missing_project_table_is_an_error() {
        let err = Manifest::parse("[compiler]\n").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse manifest"), "{err}");
    }
}
