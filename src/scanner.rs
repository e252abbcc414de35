//! 画像フォルダのスキャン
//!
//! 比較結果に画像パスを添えるため、フォルダ直下の画像を結合キーで引けるようにする。

use crate::error::{EvalError, Result};
use fashion_eval_common::normalize_image_name;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    /// 結合キー（正規化済み画像名）
    pub key: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(EvalError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let Some(ext) = path.extension() else {
            continue;
        };
        if !is_image_extension(&ext.to_string_lossy()) {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        images.push(ImageInfo {
            path: path.to_path_buf(),
            key: normalize_image_name(&file_name),
            file_name,
        });
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 結合キー → 画像パス
#[derive(Debug, Clone, Default)]
pub struct ImageCatalog {
    paths: HashMap<String, PathBuf>,
}

impl ImageCatalog {
    /// フォルダをスキャンして作成（同じキーはファイル名順で先勝ち）
    pub fn scan(folder: &Path) -> Result<Self> {
        let mut paths = HashMap::new();
        for image in scan_folder(folder)? {
            paths.entry(image.key).or_insert(image.path);
        }
        Ok(Self { paths })
    }

    pub fn path_for(&self, image: &str) -> Option<&Path> {
        self.paths
            .get(&normalize_image_name(image))
            .map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("JPG"));
        assert!(is_image_extension("webp"));
        assert!(is_image_extension("gif"));
        assert!(!is_image_extension("txt"));
        assert!(!is_image_extension("xlsx"));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(EvalError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_with_images() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("look2.JPG")).unwrap().write_all(b"dummy").unwrap();
        File::create(temp_dir.path().join("look1.png")).unwrap().write_all(b"dummy").unwrap();
        File::create(temp_dir.path().join("readme.txt")).unwrap().write_all(b"text").unwrap();

        let result = scan_folder(temp_dir.path()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].file_name, "look1.png");
        assert_eq!(result[1].key, "look2");
    }

    #[test]
    fn test_catalog_lookup_ignores_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        File::create(temp_dir.path().join("Look1.jpg")).unwrap();

        let catalog = ImageCatalog::scan(temp_dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.path_for("look1.png").is_some());
        assert!(catalog.path_for("look2").is_none());
    }
}
