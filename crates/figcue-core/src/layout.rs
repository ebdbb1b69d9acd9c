use crate::clipzone::naming::VEC_EXTENSION;
use crate::error::FigcueError;
use std::path::{Path, PathBuf};

pub const FIGURE_VECS_DIR: &str = "figureVecs";
pub const FIGURE_SVGS_DIR: &str = "figureSVGs";
pub const SVG_EXTENSION: &str = "svg";

/// The asset directory of one document: raw per-page `.vec` files at the
/// root, merged zones in `figureVecs/`, rendered zones in `figureSVGs/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    root: PathBuf,
}

impl AssetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AssetLayout { root: root.into() }
    }

    pub fn vec_dir(&self) -> PathBuf {
        self.root.join(FIGURE_VECS_DIR)
    }

    pub fn svg_dir(&self) -> PathBuf {
        self.root.join(FIGURE_SVGS_DIR)
    }

    /// Create both output directories. With `clean`, remove files left in
    /// them by an earlier run.
    pub fn prepare(&self, clean: bool) -> Result<(), FigcueError> {
        for dir in [self.vec_dir(), self.svg_dir()] {
            std::fs::create_dir_all(&dir)?;
            if clean {
                for entry in std::fs::read_dir(&dir)? {
                    let path = entry?.path();
                    if path.is_file() {
                        std::fs::remove_file(&path)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Raw page files at the root, ordered by the first number in their name
    /// and then by name. A missing root yields an empty list.
    pub fn raw_vec_files(&self) -> Result<Vec<PathBuf>, FigcueError> {
        list_with_extension(&self.root, VEC_EXTENSION)
    }

    /// Merged zone files in `figureVecs/`.
    pub fn merged_vec_files(&self) -> Result<Vec<PathBuf>, FigcueError> {
        list_with_extension(&self.vec_dir(), VEC_EXTENSION)
    }

    /// Rendered file for a merged zone file.
    pub fn svg_path_for(&self, merged: &Path) -> PathBuf {
        let stem = merged
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.svg_dir().join(format!("{stem}.{SVG_EXTENSION}"))
    }
}

fn list_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, FigcueError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if path.is_file() && matches {
            files.push(path);
        }
    }

    files.sort_by_key(|p| {
        let name = p
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        (first_number(&name), name)
    });
    Ok(files)
}

fn first_number(name: &str) -> Option<u64> {
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let layout = AssetLayout::new(dir.path());

        for name in ["image-10.vec", "image-2.vec", "image-1.vec", "notes.txt"] {
            std::fs::write(dir.path().join(name), "<VECTORIALIMAGES/>").unwrap();
        }
        layout.prepare(false).unwrap();
        assert!(layout.vec_dir().is_dir());
        assert!(layout.svg_dir().is_dir());

        let names: Vec<String> = layout
            .raw_vec_files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["image-1.vec", "image-2.vec", "image-10.vec"]);
    }

    #[test]
    fn test_prepare_clean_removes_stale_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = AssetLayout::new(dir.path());
        layout.prepare(false).unwrap();
        std::fs::write(layout.vec_dir().join("page1.vec"), "stale").unwrap();

        layout.prepare(true).unwrap();
        assert!(layout.merged_vec_files().unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_empty() {
        let layout = AssetLayout::new("/nonexistent/figcue/assets");
        assert!(layout.raw_vec_files().unwrap().is_empty());
    }

    #[test]
    fn test_svg_path_for() {
        let layout = AssetLayout::new("/assets");
        let svg = layout.svg_path_for(Path::new("/assets/figureVecs/page3Figure2.vec"));
        assert_eq!(svg, PathBuf::from("/assets/figureSVGs/page3Figure2.svg"));
    }
}
