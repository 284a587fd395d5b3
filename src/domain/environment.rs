use std::fmt;
use std::path::{Path, PathBuf};

/// 環境がどのように用意されたか。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentOrigin {
    /// この実行で新規に構築した
    Created,
    /// 呼び出し元が指定した既存の環境
    Reused,
}

/// 有効化済みの実行環境。
///
/// 以降の外部コマンドはすべてこの環境の中で実行される。この型は環境を削除しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    name: String,
    prefix: Option<PathBuf>,
    origin: EnvironmentOrigin,
}

impl Environment {
    pub fn new(name: impl Into<String>, prefix: Option<PathBuf>, origin: EnvironmentOrigin) -> Self {
        Self {
            name: name.into(),
            prefix,
            origin,
        }
    }

    pub fn with_origin(mut self, origin: EnvironmentOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn prefix(&self) -> Option<&Path> {
        self.prefix.as_deref()
    }
    pub fn origin(&self) -> EnvironmentOrigin {
        self.origin
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{} ({})", self.name, prefix.display()),
            None => write!(f, "{}", self.name),
        }
    }
}

/// 環境管理システムが認識している環境の一覧の1行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownEnvironment {
    pub name: String,
    pub prefix: Option<PathBuf>,
}

impl KnownEnvironment {
    pub fn new(name: impl Into<String>, prefix: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            prefix,
        }
    }
}
