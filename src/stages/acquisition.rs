//! データバンドルの取得。
//!
//! ダウンロードと展開は常に兄弟ディレクトリ `.<name>.partial` の中で行い、
//! 完成したツリーだけを `rename` で本来の位置に移す。そのため本来の位置に
//! ディレクトリがあれば、それは完全なバンドルとみなしてよい。中断された取得の
//! 残骸は次回の取得開始時に `.partial` ごと削除される。

use crate::config::OrchestratorConfig;
use crate::domain::bundle_archive::BundleArchive;
use crate::domain::DirectoryPath;
use crate::error::{AcquisitionError, AppError};
use crate::external::BundleFetcher;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// バンドルの取得元URLを記録するファイル名。
pub const SOURCE_MARKER: &str = ".bundle_source";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleStatus {
    AlreadyPresent,
    Acquired,
}

/// バンドルが存在することを保証する。存在すれば何もしない。
pub fn ensure_bundle(
    config: &OrchestratorConfig,
    fetcher: &dyn BundleFetcher,
) -> Result<BundleStatus, AppError> {
    let bundle_root = config.bundle_root();
    let url = &config.bundle.url;

    if bundle_root.is_dir() {
        check_source_marker(&bundle_root, url);
        info!(path = %bundle_root.display(), "データバンドルは既に存在するため、取得をスキップします");
        return Ok(BundleStatus::AlreadyPresent);
    }

    let partial = partial_dir(&bundle_root)?;
    if partial.exists() {
        warn!(path = %partial.display(), "前回中断された取得の残骸を削除します");
        fs::remove_dir_all(&partial)?;
    }
    fs::create_dir_all(&partial)?;

    let archive_path = partial.join(&config.bundle.archive_name);
    fetcher.fetch(url, &archive_path)?;

    let archive = BundleArchive::new(&archive_path)
        .map_err(|e| AcquisitionError::Extraction(e.to_string()))?;
    let extract_dir = partial.join("extract");
    let entries = archive
        .extract_into(&extract_dir)
        .map_err(|e| AcquisitionError::Extraction(e.to_string()))?;
    info!(entries, archive = %archive, "アーカイブを展開しました");

    let extracted_root = locate_extracted_root(&extract_dir, &bundle_root)?;
    fs::write(extracted_root.join(SOURCE_MARKER), url)?;

    if let Some(parent) = bundle_root.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(&extracted_root, &bundle_root)?;
    // アーカイブもここで一緒に消える
    discard_partial(&partial);

    info!(path = %bundle_root.display(), "データバンドルを配置しました");
    Ok(BundleStatus::Acquired)
}

/// 配置済みのバンドルには影響しないため、削除の失敗は警告に留める。
/// 残った `.partial` は次回の取得時に削除される。
fn discard_partial(partial: &Path) {
    if let Err(e) = fs::remove_dir_all(partial) {
        warn!(path = %partial.display(), error = %e, "作業ディレクトリを削除できませんでした");
    }
}

fn partial_dir(bundle_root: &Path) -> Result<PathBuf, AppError> {
    let name = bundle_root
        .file_name()
        .ok_or_else(|| {
            AppError::Configuration(format!(
                "バンドルの配置先 '{}' にディレクトリ名がありません。",
                bundle_root.display()
            ))
        })?
        .to_string_lossy();
    Ok(bundle_root.with_file_name(format!(".{}.partial", name)))
}

/// 展開結果のうち、バンドルの最上位に当たるディレクトリを返す。
///
/// アーカイブがバンドル名のディレクトリ1つだけを含む場合はそのディレクトリ、
/// そうでなければ展開先そのものをバンドルとみなす。
fn locate_extracted_root(extract_dir: &Path, bundle_root: &Path) -> Result<PathBuf, AppError> {
    let extracted = DirectoryPath::new(extract_dir)
        .map_err(|e| AcquisitionError::Extraction(e.to_string()))?;
    if extracted.is_empty()? {
        return Err(AcquisitionError::Extraction("アーカイブが空です。".to_string()).into());
    }

    let entries: Vec<PathBuf> = extracted
        .entries()?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;

    match entries.as_slice() {
        [only] if only.is_dir() && only.file_name() == bundle_root.file_name() => Ok(only.clone()),
        _ => Ok(extract_dir.to_path_buf()),
    }
}

fn check_source_marker(bundle_root: &Path, url: &str) {
    if let Ok(recorded) = fs::read_to_string(bundle_root.join(SOURCE_MARKER)) {
        if recorded.trim() != url {
            warn!(
                recorded = %recorded.trim(),
                configured = url,
                "既存のバンドルは別のURLから取得されています。再取得する場合はディレクトリを削除してください"
            );
        }
    }
}
