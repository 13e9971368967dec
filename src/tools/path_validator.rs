use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// 移除路徑參數結尾的 `/` 與 `\`，根目錄保持原樣
#[must_use]
pub fn normalize_directory_arg(raw: &str) -> PathBuf {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        PathBuf::from(raw)
    } else {
        PathBuf::from(trimmed)
    }
}

/// 確保資料夾存在，回傳是否為新建立
pub fn ensure_directory_exists(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_strips_trailing_separators() {
        assert_eq!(normalize_directory_arg("/music/"), PathBuf::from("/music"));
        assert_eq!(normalize_directory_arg("/music//"), PathBuf::from("/music"));
        assert_eq!(normalize_directory_arg(r"C:\music\"), PathBuf::from(r"C:\music"));
        assert_eq!(normalize_directory_arg("music"), PathBuf::from("music"));
    }

    #[test]
    fn test_normalize_keeps_root() {
        assert_eq!(normalize_directory_arg("/"), PathBuf::from("/"));
    }

    #[test]
    fn test_ensure_directory_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();

        assert!(ensure_directory_exists(&file).is_err());
    }

    #[test]
    fn test_ensure_directory_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        assert!(ensure_directory_exists(&nested).unwrap());
        assert!(nested.is_dir());
        assert!(!ensure_directory_exists(&nested).unwrap());
    }
}
