use crate::error::SPAWN_FAILURE_CODE;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// 外部コマンドの実行失敗。
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("'{program}' を起動できません: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' が終了コード {code} で失敗しました")]
    Exit { program: String, code: i32 },
}

impl ProcessError {
    /// 呼び出し元へ伝える終了コード。シグナルで終了した場合は `1`。
    pub fn code(&self) -> i32 {
        match self {
            ProcessError::Spawn { .. } => SPAWN_FAILURE_CODE,
            ProcessError::Exit { code, .. } => *code,
        }
    }
}

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}

/// コマンドを実行して終了を待つ。標準入出力は親プロセスのものを引き継ぐ。
pub fn run_checked(command: &mut Command) -> Result<(), ProcessError> {
    debug!(?command, "外部コマンドを実行します");
    let program = program_name(command);
    let status = command
        .status()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(ProcessError::Exit {
            program,
            code: status.code().unwrap_or(1),
        })
    }
}

/// コマンドを実行し、標準出力を文字列として返す。
pub fn capture_stdout(command: &mut Command) -> Result<String, ProcessError> {
    debug!(?command, "外部コマンドを実行します");
    let program = program_name(command);
    let output = command
        .output()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(ProcessError::Exit {
            program,
            code: output.status.code().unwrap_or(1),
        })
    }
}
