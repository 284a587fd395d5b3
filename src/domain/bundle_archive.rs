use super::path_error::PathError;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// ダウンロード済みのデータバンドル（ZIPアーカイブ）へのパス。
#[derive(Debug)]
pub struct BundleArchive(PathBuf);

impl BundleArchive {
    // --- Public Methods ---

    /// 新しい `BundleArchive` インスタンスを生成する。
    ///
    /// パスが存在し、ファイルであり、かつ拡張子が `.zip` であることを検証する。
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' は存在しません。",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' はファイルではありません。",
                path.display()
            )));
        }
        if path.extension().and_then(|s| s.to_str()) != Some("zip") {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' は.zipファイルではありません。",
                path.display()
            )));
        }
        Ok(Self(path.to_path_buf()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// アーカイブを `destination` 以下に展開する。
    ///
    /// # 戻り値
    /// * `Ok(usize)`: アーカイブに含まれていたエントリの数。
    pub fn extract_into(&self, destination: &Path) -> Result<usize, PathError> {
        let mut archive = self.open_archive()?;
        let entry_count = archive.len();
        std::fs::create_dir_all(destination)?;
        archive
            .extract(destination)
            .map_err(|e| PathError::InvalidPath(format!("ZIPファイルの展開に失敗: {}", e)))?;
        Ok(entry_count)
    }

    // --- Private Helper Methods ---

    fn open_archive(&self) -> Result<ZipArchive<File>, PathError> {
        let file = File::open(&self.0)
            .map_err(|e| PathError::InvalidPath(format!("ZIPファイルを開けません: {}", e)))?;
        ZipArchive::new(file)
            .map_err(|e| PathError::InvalidPath(format!("無効なZIPファイル: {}", e)))
    }
}

impl fmt::Display for BundleArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// テスト用に (name, bytes) のエントリからZIPファイルを作る。
/// 名前が `/` で終わるエントリはディレクトリとして追加する。
#[cfg(test)]
pub(crate) fn write_test_zip(path: &Path, entries: &[(&str, &[u8])]) {
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::CompressionMethod;

    let file = File::create(path).expect("failed to create zip file");
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, bytes) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options)
                .expect("add_directory failed");
        } else {
            zip.start_file(*name, options).expect("start_file failed");
            zip.write_all(bytes).expect("write_all failed");
        }
    }
    zip.finish().expect("finish zip failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn extract_into_recreates_archive_tree() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("resources.zip");
        write_test_zip(
            &zip_path,
            &[
                ("resources/", b""),
                ("resources/models/", b""),
                ("resources/models/encoder.pth", b"weights"),
                ("resources/README", b"bundle v1"),
            ],
        );

        let archive = BundleArchive::new(&zip_path).expect("BundleArchive::new should succeed");
        let out = dir.path().join("out");
        let count = archive.extract_into(&out).expect("extract should succeed");

        assert_eq!(count, 4);
        assert_eq!(
            fs::read(out.join("resources").join("models").join("encoder.pth")).unwrap(),
            b"weights"
        );
        assert_eq!(
            fs::read_to_string(out.join("resources").join("README")).unwrap(),
            "bundle v1"
        );
    }

    #[test]
    fn new_rejects_wrong_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resources.tar.gz");
        File::create(&path).unwrap();

        match BundleArchive::new(&path) {
            Err(PathError::InvalidPath(msg)) => assert!(msg.contains(".zipファイルではありません")),
            other => panic!("Expected InvalidPath error, got {:?}", other),
        }
    }

    #[test]
    fn new_rejects_missing_file() {
        let dir = tempdir().unwrap();
        match BundleArchive::new(dir.path().join("missing.zip")) {
            Err(PathError::InvalidPath(msg)) => assert!(msg.contains("存在しません")),
            other => panic!("Expected InvalidPath error, got {:?}", other),
        }
    }

    #[test]
    fn extract_into_rejects_corrupt_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("truncated.zip");
        fs::write(&path, b"PK\x03\x04 definitely not a complete archive").unwrap();

        let archive = BundleArchive::new(&path).unwrap();
        match archive.extract_into(&dir.path().join("out")) {
            Err(PathError::InvalidPath(msg)) => assert!(msg.contains("無効なZIPファイル")),
            other => panic!("Expected InvalidPath error, got {:?}", other),
        }
    }
}
