use super::path_error::PathError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 存在が確認済みのディレクトリへのパス。
#[derive(Debug)]
pub struct DirectoryPath {
    pub path: PathBuf,
}

impl DirectoryPath {
    // コンストラクタ: パスが存在し、ディレクトリであることを検証する
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' は存在しません。",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' はディレクトリではありません。",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// ディレクトリを（必要なら親ごと）作成してから `DirectoryPath` を返す。
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        fs::create_dir_all(path.as_ref())?;
        Self::new(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    // ディレクトリが空かどうか
    pub fn is_empty(&self) -> Result<bool, PathError> {
        let mut entries = fs::read_dir(&self.path)?;
        Ok(entries.next().is_none())
    }

    pub fn entries(&self) -> Result<fs::ReadDir, PathError> {
        Ok(fs::read_dir(&self.path)?)
    }

    /// 中身をすべて削除し、空のディレクトリにする。ディレクトリ自体は残す。
    pub fn clear(&self) -> Result<(), PathError> {
        for entry in self.entries()? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// `source` 以下のツリーをこのディレクトリへ再帰的にコピーする。
    ///
    /// # 戻り値
    /// * `Ok(usize)`: コピーしたファイルの数。
    pub fn copy_tree_from(&self, source: &DirectoryPath) -> Result<usize, PathError> {
        let mut copied = 0;
        for entry in WalkDir::new(source.as_path()).min_depth(1) {
            let entry = entry.map_err(|e| PathError::InvalidPath(e.to_string()))?;
            // WalkDir は source 以下しか返さないので strip_prefix は失敗しない
            let relative = entry
                .path()
                .strip_prefix(source.as_path())
                .map_err(|e| PathError::InvalidPath(e.to_string()))?;
            let destination = self.path.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&destination)?;
            } else {
                if let Some(parent) = destination.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &destination)?;
                copied += 1;
            }
        }
        Ok(copied)
    }
}

impl fmt::Display for DirectoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
