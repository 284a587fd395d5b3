//! ワークフローが利用する外部システムとの境界。
//!
//! 各ステージはここで定義したトレイト越しにのみ外部へアクセスする。
//! 本番では conda / HTTP を使う実装を、テストでは記録用の偽物を差し込む。

pub mod conda;
pub mod http;
pub mod process;

use crate::config::EnvironmentConfig;
use crate::domain::{Environment, KnownEnvironment};
use crate::error::AppError;
use std::path::{Path, PathBuf};

pub use conda::{CondaManager, CondaPipeline};
pub use http::HttpFetcher;

/// 名前付きの実行環境を管理するシステム。
pub trait EnvironmentManager {
    /// 認識しているすべての環境を返す。
    fn list(&self) -> Result<Vec<KnownEnvironment>, AppError>;

    /// `name` と完全に一致する環境を探す。部分一致は一致とみなさない。
    fn find(&self, name: &str) -> Result<Option<KnownEnvironment>, AppError> {
        Ok(self.list()?.into_iter().find(|known| known.name == name))
    }

    fn exists(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.find(name)?.is_some())
    }

    /// 設定どおりの名前とPythonバージョンで環境を作成する。
    fn create(&self, spec: &EnvironmentConfig) -> Result<(), AppError>;

    /// 依存パッケージ一覧を環境にインストールする。
    fn install(&self, name: &str, manifest: &Path) -> Result<(), AppError>;

    /// 環境を有効化し、以降のコマンドが実行される `Environment` を返す。
    fn activate(&self, name: &str) -> Result<Environment, AppError>;
}

/// URL からファイルを取得する。
pub trait BundleFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), AppError>;
}

/// 推論パイプラインへの1回分の依頼内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub target: String,
    pub random: bool,
    pub extra_args: Vec<String>,
    pub working_dir: PathBuf,
}

impl InferenceRequest {
    /// エントリポイントの後ろに付ける引数。
    pub fn arguments(&self) -> Vec<String> {
        let mut args = vec!["--target".to_string(), self.target.clone()];
        if self.random {
            args.push("--random".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// 外部の推論パイプライン。完了するまでブロックする。
pub trait PipelineRunner {
    fn run(&self, environment: &Environment, request: &InferenceRequest) -> Result<(), AppError>;
}
