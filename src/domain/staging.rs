//! パイプラインが入力を読み込む固定の配置場所。

use super::directory_path::DirectoryPath;
use super::path_error::PathError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingArea {
    raw_images: PathBuf,
    masks: PathBuf,
}

/// コピー元と配置先の位置関係。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    Disjoint,
    /// 同じディレクトリを指している (シンボリックリンク経由を含む)
    Same,
    /// 一方が他方の内側にある
    Nested,
}

impl StagingArea {
    pub fn new(raw_images: impl Into<PathBuf>, masks: impl Into<PathBuf>) -> Self {
        Self {
            raw_images: raw_images.into(),
            masks: masks.into(),
        }
    }

    pub fn raw_images(&self) -> &Path {
        &self.raw_images
    }
    pub fn masks(&self) -> &Path {
        &self.masks
    }

    /// 正規化したパス同士で `source` と `destination` の位置関係を調べる。
    ///
    /// `destination` はまだ存在しなくてもよい。
    pub fn overlap(source: &DirectoryPath, destination: &Path) -> Result<Overlap, PathError> {
        let source = source.as_path().canonicalize()?;
        let destination = canonicalize_lenient(destination)?;

        if source == destination {
            Ok(Overlap::Same)
        } else if source.starts_with(&destination) || destination.starts_with(&source) {
            Ok(Overlap::Nested)
        } else {
            Ok(Overlap::Disjoint)
        }
    }

    /// `destination` の中身を `source` の中身で完全に置き換える。
    ///
    /// 以前の内容は削除される。コピーしたファイル数を返す。
    /// 2つのディレクトリが重なっている場合は何も消さずにエラーを返す。
    pub fn replace_contents(source: &DirectoryPath, destination: &Path) -> Result<usize, PathError> {
        if Self::overlap(source, destination)? != Overlap::Disjoint {
            return Err(PathError::InvalidPath(format!(
                "'{}' と '{}' が重なっているため置き換えできません。",
                source,
                destination.display()
            )));
        }
        let destination = DirectoryPath::create(destination)?;
        destination.clear()?;
        destination.copy_tree_from(source)
    }
}

/// 存在する最も近い祖先までを正規化し、残りの要素をつなぎ直す。
fn canonicalize_lenient(path: &Path) -> Result<PathBuf, PathError> {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if current.exists() {
            let mut resolved = current.canonicalize()?;
            resolved.extend(missing.iter().rev());
            return Ok(resolved);
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            _ => {
                return Err(PathError::InvalidPath(format!(
                    "パス '{}' を解決できません。",
                    path.display()
                )))
            }
        }
    }
}
