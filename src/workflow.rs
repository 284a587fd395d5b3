//! アプリケーションのメインワークフローを定義するモジュール。
//!
//! 各ステージを決められた順序で実行する。どこかのステージが失敗すると、
//! その時点で実行を打ち切り、最後に到達したステージとエラーを返す。
//! 再試行や途中からの再開は行わない。

use crate::config::OrchestratorConfig;
use crate::domain::{Environment, RunConfig};
use crate::error::AppError;
use crate::external::{BundleFetcher, EnvironmentManager, PipelineRunner};
use crate::stages::acquisition::{self, BundleStatus};
use crate::stages::{cleanup, environment, inputs, pipeline};
use std::fmt;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

/// 実行の進行状況。この順にしか進まない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Parsed,
    EnvironmentReady,
    DataReady,
    InputsValidated,
    PipelineRan,
    Cleaned,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Parsed => "引数解析",
            Stage::EnvironmentReady => "環境準備",
            Stage::DataReady => "データ取得",
            Stage::InputsValidated => "入力検証",
            Stage::PipelineRan => "推論実行",
            Stage::Cleaned => "後片付け",
        };
        write!(f, "{}", label)
    }
}

/// 失敗で終了した実行。`stage` は失敗する直前に到達していたステージ。
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: AppError,
}

impl StageFailure {
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}の後] {}", self.stage, self.error)
    }
}

impl std::error::Error for StageFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// ワークフローが利用する外部システム一式。
pub struct Collaborators<'a> {
    pub environments: &'a dyn EnvironmentManager,
    pub fetcher: &'a dyn BundleFetcher,
    pub pipeline: &'a dyn PipelineRunner,
}

/// 正常に完了した実行の記録。
#[derive(Debug)]
pub struct RunReport {
    pub stage: Stage,
    pub environment: Environment,
    pub bundle: BundleStatus,
    pub removed: Vec<PathBuf>,
}

pub struct Workflow<'a> {
    config: &'a OrchestratorConfig,
    collaborators: Collaborators<'a>,
}

impl<'a> Workflow<'a> {
    pub fn new(config: &'a OrchestratorConfig, collaborators: Collaborators<'a>) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// アプリケーションのメインロジックを実行します。
    ///
    /// # 引数
    /// * `run`: コマンドラインから解決された実行設定。
    /// * `reader` / `writer`: 入力確認のプロンプトに使う入出力。
    ///
    /// # 戻り値
    /// * `Ok(RunReport)`: すべてのステージが完了した場合。
    /// * `Err(StageFailure)`: いずれかのステージが失敗した場合。
    pub fn run<R: BufRead, W: Write>(
        &self,
        run: &RunConfig,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<RunReport, StageFailure> {
        let mut stage = Stage::Parsed;
        let c = &self.collaborators;

        // 1. 環境の構築または再利用
        let environment = advance(
            &mut stage,
            Stage::EnvironmentReady,
            environment::provision(run, self.config, c.environments),
        )?;

        // 2. データバンドルの取得
        let bundle = advance(
            &mut stage,
            Stage::DataReady,
            acquisition::ensure_bundle(self.config, c.fetcher),
        )?;

        // 3. 入力の確認と検証
        let staging = self.config.staging_area();
        advance(
            &mut stage,
            Stage::InputsValidated,
            inputs::prepare_inputs(run, &staging, reader, writer),
        )?;

        // 4. 推論パイプライン
        advance(
            &mut stage,
            Stage::PipelineRan,
            pipeline::invoke(run, &environment, c.pipeline, &self.config.root),
        )?;

        // 5. 後片付け（失敗しても実行結果には影響しない）
        let removed = cleanup::remove_intermediates(&self.config.cleanup_directories());
        stage = Stage::Cleaned;

        info!("すべての処理が完了しました");
        Ok(RunReport {
            stage,
            environment,
            bundle,
            removed,
        })
    }
}

fn advance<T>(stage: &mut Stage, next: Stage, result: Result<T, AppError>) -> Result<T, StageFailure> {
    match result {
        Ok(value) => {
            info!(stage = %next, "ステージが完了しました");
            *stage = next;
            Ok(value)
        }
        Err(error) => Err(StageFailure {
            stage: *stage,
            error,
        }),
    }
}
