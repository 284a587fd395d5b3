use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 中間生成物のディレクトリを再帰的に削除する。
///
/// 存在しないディレクトリや削除の失敗は警告を出すだけで、実行結果には影響しない。
/// 実際に削除できたディレクトリを返す。
pub fn remove_intermediates(directories: &[PathBuf]) -> Vec<PathBuf> {
    directories
        .iter()
        .filter(|dir| remove_directory(dir))
        .cloned()
        .collect()
}

fn remove_directory(dir: &Path) -> bool {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            info!(path = %dir.display(), "中間生成物を削除しました");
            true
        }
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "中間生成物を削除できませんでした");
            false
        }
    }
}
