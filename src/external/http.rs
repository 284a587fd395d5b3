use super::BundleFetcher;
use crate::error::{AcquisitionError, AppError};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// HTTP(S) でファイルをダウンロードする。
///
/// 大きなバンドルを扱うため、タイムアウトは設定しない。
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTPクライアントを作成できません: {}", e)))?;
        Ok(Self { client })
    }
}

impl BundleFetcher for HttpFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), AppError> {
        let download_error = |reason: String| AcquisitionError::Download {
            url: url.to_string(),
            reason,
        };

        info!(url, destination = %destination.display(), "ダウンロードを開始します");
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| download_error(e.to_string()))?;

        let mut file = File::create(destination)?;
        let bytes = response
            .copy_to(&mut file)
            .map_err(|e| download_error(e.to_string()))?;
        file.sync_all()?;

        info!(bytes, "ダウンロードが完了しました");
        Ok(())
    }
}
