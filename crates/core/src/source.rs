use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 入力1件分のパスと、そこから一度だけ導出した名前・語幹・拡張子。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub name: String,
    pub stem: String,
    pub suffix: String,
}

impl SourceFile {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default();
        // 拡張子は先頭のドットを含む。拡張子なしは空文字列。
        let suffix = path
            .extension()
            .map(|v| format!(".{}", v.to_string_lossy()))
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            name,
            stem,
            suffix,
        }
    }
}
