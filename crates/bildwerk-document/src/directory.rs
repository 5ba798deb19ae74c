// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory scanning — find convertible images and prepare the output folder.

use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use tracing::{debug, info, instrument};

/// Lowercase file extensions picked up from the input directory.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "gif"];

/// Whether `path` carries one of [`SUPPORTED_EXTENSIONS`], ignoring case.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// List the supported images directly inside `dir`.
///
/// Not recursive. Order is whatever the filesystem enumerates; callers must
/// not depend on it. Entries that are not regular files are skipped.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let input_error = |source| BildwerkError::InputDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(input_error)? {
        let path = entry.map_err(input_error)?.path();
        if !is_supported(&path) {
            continue;
        }
        if !path.is_file() {
            debug!(path = %path.display(), "Skipping non-file entry");
            continue;
        }
        images.push(path);
    }

    info!(count = images.len(), "Images found");
    Ok(images)
}

/// Create `dir` and any missing ancestors.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| BildwerkError::OutputDirectory {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!(dir = %dir.display(), "Output directory ready");
    Ok(())
}

/// `<output_dir>/<stem of source>.pdf`.
pub fn output_path_for(source: &Path, output_dir: &Path) -> PathBuf {
    let mut name = source
        .file_stem()
        .unwrap_or(source.as_os_str())
        .to_os_string();
    name.push(".pdf");
    output_dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter_ignores_case() {
        assert!(is_supported(Path::new("photo.JPG")));
        assert!(is_supported(Path::new("scan.Tiff")));
        assert!(is_supported(Path::new("dir/a.jpeg")));
        assert!(!is_supported(Path::new("photo.TXT")));
        assert!(!is_supported(Path::new("photo.tif")));
        assert!(!is_supported(Path::new("png")));
        assert!(!is_supported(Path::new("archive.png.zip")));
    }

    #[test]
    fn lists_only_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.JPG", "notes.txt", "c.gif"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("folder.png")).unwrap();

        let mut names: Vec<String> = list_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["a.png", "b.JPG", "c.gif"]);
    }

    #[test]
    fn missing_input_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_images(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, BildwerkError::InputDirectory { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn output_dir_is_created_with_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_output_dir(&nested).unwrap();
    }

    #[test]
    fn output_dir_over_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let err = ensure_output_dir(&blocker.join("out")).unwrap_err();
        assert!(matches!(err, BildwerkError::OutputDirectory { .. }));
    }

    #[test]
    fn output_name_uses_stem() {
        let out = Path::new("/out");
        assert_eq!(output_path_for(Path::new("/in/a.png"), out), Path::new("/out/a.pdf"));
        assert_eq!(
            output_path_for(Path::new("/in/holiday.2024.JPG"), out),
            Path::new("/out/holiday.2024.pdf")
        );
    }
}
