//! Locating the `.taxi` sources of a build.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::manifest::{Manifest, ProjectError, MANIFEST_FILE};

/// The files to compile and how strictly.
#[derive(Debug)]
pub struct BuildInputs {
    pub files: Vec<PathBuf>,
    pub warnings_as_errors: bool,
}

/// Resolve a build path: a single file, a project directory with a
/// `taxi.toml`, or a plain directory of sources.
pub fn resolve_inputs(path: &Path) -> Result<BuildInputs, ProjectError> {
    if !path.exists() {
        return Err(ProjectError::NotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(BuildInputs {
            files: vec![path.to_path_buf()],
            warnings_as_errors: false,
        });
    }

    let manifest_path = path.join(MANIFEST_FILE);
    let (root, warnings_as_errors) = if manifest_path.is_file() {
        let manifest = Manifest::from_file(&manifest_path)?;
        debug!(project = %manifest.project.name, version = %manifest.project.version, "loaded manifest");
        (
            path.join(&manifest.project.source_root),
            manifest.compiler.warnings_as_errors,
        )
    } else {
        (path.to_path_buf(), false)
    };

    if !root.is_dir() {
        return Err(ProjectError::NotFound(root));
    }
    let files: Vec<PathBuf> = discover_taxi_files(&root)?
        .into_iter()
        .map(|relative| root.join(relative))
        .collect();
    if files.is_empty() {
        return Err(ProjectError::NoSources(root));
    }
    Ok(BuildInputs {
        files,
        warnings_as_errors,
    })
}

/// Recursively discover all `.taxi` files under `root`.
///
/// Returns paths relative to `root`, sorted. Hidden entries (names starting
/// with `.`) are skipped.
pub fn discover_taxi_files(root: &Path) -> Result<Vec<PathBuf>, ProjectError> {
    let mut files = Vec::new();
    discover_recursive(root, root, &mut files).map_err(|source| ProjectError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    files.sort();
    Ok(files)
}

fn discover_recursive(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        if entry_path.is_dir() {
            discover_recursive(root, &entry_path, files)?;
        } else if entry_path.extension().and_then(|e| e.to_str()) == Some("taxi") {
            let relative = entry_path
                .strip_prefix(root)
                .unwrap_or(&entry_path)
                .to_path_buf();
            files.push(relative);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_sorted_files_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("model/nested")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join("z.taxi"), "").unwrap();
        fs::write(root.join("model/a.taxi"), "").unwrap();
        fs::write(root.join("model/nested/b.taxi"), "").unwrap();
        fs::write(root.join(".cache/c.taxi"), "").unwrap();
        fs::write(root.join("notes.md"), "").unwrap();

        let files = discover_taxi_files(root).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("model/a.taxi"),
                PathBuf::from("model/nested/b.taxi"),
                PathBuf::from("z.taxi"),
            ]
        );
    }

    #[test]
    fn manifest_selects_source_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("schemas")).unwrap();
        fs::write(root.join("schemas/a.taxi"), "type A").unwrap();
        fs::write(root.join("ignored.taxi"), "type B").unwrap();
        fs::write(
            root.join(MANIFEST_FILE),
            "[project]\nname = \"p\"\nversion = \"0.1.0\"\nsource_root = \"schemas\"\n\n[compiler]\nwarnings_as_errors = true\n",
        )
        .unwrap();

        let inputs = resolve_inputs(root).unwrap();
        assert_eq!(inputs.files, vec![root.join("schemas").join("a.taxi")]);
        assert!(inputs.warnings_as_errors);
    }

    #[test]
    fn empty_directory_has_no_sources() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_inputs(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NoSources(_)));
    }

    #[test]
    fn missing_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_inputs(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound(_)));
    }
}
