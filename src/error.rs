use crate::domain::path_error::PathError;
use std::path::PathBuf;
use thiserror::Error;

/// 起動できなかった外部コマンドに割り当てる終了コード。
pub const SPAWN_FAILURE_CODE: i32 = 127;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/Oエラーが発生しました: {0}")]
    Io(#[from] std::io::Error),

    #[error("パス関連のエラー: {0}")]
    Path(#[from] PathError),

    #[error("設定エラー: {0}")]
    Configuration(String),

    #[error(
        "環境 '{name}' が見つかりません。有効な環境名を指定するか、--environment を省略して環境を自動構築してください。"
    )]
    EnvironmentNotFound { name: String },

    #[error("無効なターゲットです: '{0}'")]
    InvalidTarget(String),

    #[error("環境の構築に失敗しました ({step}): 終了コード {code}")]
    Provisioning { step: String, code: i32 },

    #[error("データの取得に失敗しました: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("入力の検証に失敗しました: {0}")]
    Validation(#[from] ValidationError),

    #[error("推論パイプラインが失敗しました: 終了コード {code}")]
    Pipeline { code: i32 },
}

/// データバンドルの取得中に発生するエラー。
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("'{url}' のダウンロードに失敗しました: {reason}")]
    Download { url: String, reason: String },

    #[error("アーカイブの展開に失敗しました: {0}")]
    Extraction(String),
}

/// 入力の確認・検証で発生するエラー。
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("入力の準備が確認できませんでした。ファイルを配置してから、もう一度実行してください。")]
    NotConfirmed,

    #[error("{kind}ディレクトリ '{}' が空です。ファイルを配置してから、もう一度実行してください。", .path.display())]
    EmptyDirectory { kind: InputKind, path: PathBuf },

    #[error("{kind}ディレクトリ '{}' が存在しません。", .path.display())]
    MissingDirectory { kind: InputKind, path: PathBuf },

    #[error("{kind}ディレクトリ '{}' は配置場所 '{}' と入れ子になっています。別のディレクトリを指定してください。", .path.display(), .staging.display())]
    NestedDirectory {
        kind: InputKind,
        path: PathBuf,
        staging: PathBuf,
    },
}

/// 検証対象の入力の種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Images,
    Masks,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Images => write!(f, "画像"),
            InputKind::Masks => write!(f, "マスク"),
        }
    }
}

/// エラーの分類。ログやメッセージの見出しに使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Provisioning,
    Acquisition,
    Validation,
    Pipeline,
    Io,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Configuration(_)
            | AppError::EnvironmentNotFound { .. }
            | AppError::InvalidTarget(_) => ErrorCategory::Configuration,
            AppError::Provisioning { .. } => ErrorCategory::Provisioning,
            AppError::Acquisition(_) => ErrorCategory::Acquisition,
            AppError::Validation(_) => ErrorCategory::Validation,
            AppError::Pipeline { .. } => ErrorCategory::Pipeline,
            AppError::Io(_) | AppError::Path(_) => ErrorCategory::Io,
        }
    }

    /// プロセスの終了コード。
    ///
    /// 環境構築とパイプラインの失敗はサブプロセスの終了コードをそのまま返し、
    /// それ以外はすべて `1` を返す。
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Provisioning { code, .. } | AppError::Pipeline { code } => *code,
            _ => 1,
        }
    }
}
