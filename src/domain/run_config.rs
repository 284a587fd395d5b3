use std::path::{Path, PathBuf};

/// 現在サポートしている唯一のターゲット。
pub const UNKNOWN_TARGET: &str = "UNKNOWN";

/// 1回の実行につき一度だけ構築される実行設定。
///
/// 構築後は変更されない。クレート外からはゲッター経由でのみ参照できる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub(crate) environment_name: Option<String>,
    pub(crate) image_dir: Option<PathBuf>,
    pub(crate) mask_dir: Option<PathBuf>,
    pub(crate) target: String,
    pub(crate) random: bool,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) passthrough: Vec<String>,
}

impl RunConfig {
    /// 既存環境の名前。`None` の場合は新しい環境を構築する。
    pub fn environment_name(&self) -> Option<&str> {
        self.environment_name.as_deref()
    }
    pub fn image_dir(&self) -> Option<&Path> {
        self.image_dir.as_deref()
    }
    pub fn mask_dir(&self) -> Option<&Path> {
        self.mask_dir.as_deref()
    }
    pub fn target(&self) -> &str {
        &self.target
    }
    pub fn random(&self) -> bool {
        self.random
    }
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
    /// 最初の未知のトークン以降。パイプラインにそのまま渡される。
    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    pub fn has_supported_target(&self) -> bool {
        self.target == UNKNOWN_TARGET
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            environment_name: None,
            image_dir: None,
            mask_dir: None,
            target: UNKNOWN_TARGET.to_string(),
            random: false,
            config_path: None,
            passthrough: Vec::new(),
        }
    }
}
