use crate::domain::{RunConfig, UNKNOWN_TARGET};
use crate::error::AppError;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// 実行環境とデータを準備し、画像からの推論パイプラインを実行するツール
#[derive(Parser, Debug)]
#[command(name = "image2reg-run", author, version, about, long_about = None)]
pub struct Args {
    /// 再利用する既存の環境名 (省略時は新しい環境を自動構築)
    #[arg(short = 'e', long = "environment", value_name = "NAME")]
    pub environment: Option<String>,

    /// 画像ファイルを含むフォルダのパス (省略時は配置場所にあるものを使用)
    #[arg(long = "image_dir", value_name = "PATH")]
    pub image_dir: Option<PathBuf>,

    /// マスクファイルを含むフォルダのパス (省略時は配置場所にあるものを使用)
    #[arg(long = "mask_dir", value_name = "PATH")]
    pub mask_dir: Option<PathBuf>,

    /// 推論対象のターゲット
    #[arg(long, value_name = "ID", default_value = UNKNOWN_TARGET)]
    pub target: String,

    /// パイプラインにランダムシードのフラグを渡す
    #[arg(long)]
    pub random: bool,

    /// 設定ファイル (JSON) のパス
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 最初の未知の引数以降。そのままパイプラインに渡される
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub passthrough: Vec<String>,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        RunConfig {
            environment_name: args.environment,
            image_dir: args.image_dir,
            mask_dir: args.mask_dir,
            target: args.target,
            random: args.random,
            config_path: args.config,
            passthrough: args.passthrough,
        }
    }
}

/// 引数解析の結果。
#[derive(Debug)]
pub enum Invocation {
    /// `--help` / `--version`。表示するテキストを持つ。以降のステージは実行しない
    Help(String),
    Run(RunConfig),
}

/// トークン列（先頭はプログラム名）を解析する。
pub fn resolve<I, T>(tokens: I) -> Result<Invocation, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(tokens) {
        Ok(args) => Ok(Invocation::Run(args.into())),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Invocation::Help(e.render().to_string()))
        }
        Err(e) => Err(AppError::Configuration(e.render().to_string())),
    }
}
