//! 実行全体で共有する設定。
//!
//! 環境名や配置場所などの固定値は、すべてここから各ステージへ渡される。
//! `--config` でJSONファイルが指定された場合はその内容で上書きし、
//! 指定されなかった項目は既定値のままとなる。

use crate::domain::{RunConfig, StagingArea};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// 相対パスの基準となる作業ディレクトリ
    pub root: PathBuf,
    pub environment: EnvironmentConfig,
    pub bundle: BundleConfig,
    pub staging: StagingConfig,
    pub cleanup: CleanupConfig,
    pub pipeline: PipelineConfig,
}

/// 新規に構築する環境の設定
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// conda 互換の環境管理コマンド (`conda`, `mamba` など)
    pub manager: String,
    pub name: String,
    pub python_version: String,
    /// 固定バージョンの依存パッケージ一覧 (pip の requirements 形式)
    pub manifest: PathBuf,
}

/// データバンドルの取得元と配置先
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BundleConfig {
    pub url: String,
    pub root: PathBuf,
    pub archive_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StagingConfig {
    pub raw_images: PathBuf,
    pub masks: PathBuf,
}

/// 成功時に削除する中間生成物のディレクトリ
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub directories: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 環境内で実行するコマンドとその引数
    pub entrypoint: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            environment: EnvironmentConfig::default(),
            bundle: BundleConfig::default(),
            staging: StagingConfig::default(),
            cleanup: CleanupConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            manager: "conda".to_string(),
            name: "image2reg".to_string(),
            python_version: "3.8.10".to_string(),
            manifest: PathBuf::from("requirements.txt"),
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            url: "https://zenodo.org/record/7350640/files/resources.zip".to_string(),
            root: PathBuf::from("data/resources"),
            archive_name: "resources.zip".to_string(),
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            raw_images: PathBuf::from("test_data/UNKNOWN/images/raw/plate"),
            masks: PathBuf::from("test_data/UNKNOWN/images/unet_masks/plate"),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            directories: vec![
                PathBuf::from("test_data/UNKNOWN/images/preprocessed"),
                PathBuf::from("test_data/UNKNOWN/metadata"),
            ],
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            entrypoint: vec!["python".to_string(), "run.py".to_string()],
        }
    }
}

impl OrchestratorConfig {
    /// JSONファイルから設定を読み込む。
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "設定ファイル '{}' を読み込めません: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&text).map_err(|e| match e {
            AppError::Configuration(msg) => {
                AppError::Configuration(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// `--config` が指定されていればそのファイルを、なければ既定値を使う。
    pub fn for_run(run: &RunConfig) -> Result<Self, AppError> {
        match run.config_path() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| AppError::Configuration(format!("設定ファイルの形式が不正です: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// `root` からの相対パスを解決する。絶対パスはそのまま返る。
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn staging_area(&self) -> StagingArea {
        StagingArea::new(
            self.resolve(&self.staging.raw_images),
            self.resolve(&self.staging.masks),
        )
    }

    pub fn bundle_root(&self) -> PathBuf {
        self.resolve(&self.bundle.root)
    }

    pub fn cleanup_directories(&self) -> Vec<PathBuf> {
        self.cleanup
            .directories
            .iter()
            .map(|dir| self.resolve(dir))
            .collect()
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.environment.name.trim().is_empty() {
            return Err(AppError::Configuration(
                "environment.name が空です。".to_string(),
            ));
        }
        if self.bundle.url.trim().is_empty() {
            return Err(AppError::Configuration("bundle.url が空です。".to_string()));
        }
        if self.bundle.root.file_name().is_none() {
            return Err(AppError::Configuration(format!(
                "bundle.root '{}' はディレクトリ名で終わる必要があります。",
                self.bundle.root.display()
            )));
        }
        if self.pipeline.entrypoint.is_empty() {
            return Err(AppError::Configuration(
                "pipeline.entrypoint が空です。".to_string(),
            ));
        }
        Ok(())
    }
}
