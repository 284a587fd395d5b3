//! conda 互換コマンドを使った環境管理とパイプライン実行。

use super::process::{capture_stdout, run_checked};
use super::{EnvironmentManager, InferenceRequest, PipelineRunner};
use crate::config::EnvironmentConfig;
use crate::domain::{Environment, EnvironmentOrigin, KnownEnvironment};
use crate::error::AppError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CondaManager {
    program: String,
    working_dir: PathBuf,
}

impl CondaManager {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.current_dir(&self.working_dir);
        command
    }

    fn create_command(&self, spec: &EnvironmentConfig) -> Command {
        let mut command = self.command();
        command
            .arg("create")
            .arg("--yes")
            .arg("--name")
            .arg(&spec.name)
            .arg(format!("python={}", spec.python_version));
        command
    }

    fn install_command(&self, name: &str, manifest: &Path) -> Command {
        let mut command = self.command();
        command
            .args(["run", "--no-capture-output", "--name", name])
            .args(["python", "-m", "pip", "install", "--requirement"])
            .arg(manifest);
        command
    }
}

impl EnvironmentManager for CondaManager {
    fn list(&self) -> Result<Vec<KnownEnvironment>, AppError> {
        let stdout = capture_stdout(self.command().args(["env", "list"])).map_err(|e| {
            AppError::Provisioning {
                step: "env list".to_string(),
                code: e.code(),
            }
        })?;
        Ok(parse_env_list(&stdout))
    }

    fn create(&self, spec: &EnvironmentConfig) -> Result<(), AppError> {
        info!(name = %spec.name, python = %spec.python_version, "環境を作成します");
        run_checked(&mut self.create_command(spec)).map_err(|e| AppError::Provisioning {
            step: "create".to_string(),
            code: e.code(),
        })
    }

    fn install(&self, name: &str, manifest: &Path) -> Result<(), AppError> {
        info!(name, manifest = %manifest.display(), "依存パッケージをインストールします");
        run_checked(&mut self.install_command(name, manifest)).map_err(|e| {
            AppError::Provisioning {
                step: "pip install".to_string(),
                code: e.code(),
            }
        })
    }

    fn activate(&self, name: &str) -> Result<Environment, AppError> {
        // conda の環境はプロセスの外から「有効化」できないため、
        // 以降のコマンドはすべて `conda run --name` 経由で実行する。
        let known = self
            .find(name)?
            .ok_or_else(|| AppError::EnvironmentNotFound {
                name: name.to_string(),
            })?;
        Ok(Environment::new(
            known.name,
            known.prefix,
            EnvironmentOrigin::Reused,
        ))
    }
}

/// `conda env list` の出力を解析する。
///
/// 名前のない環境（パスだけの行）とコメント行は無視する。
pub fn parse_env_list(stdout: &str) -> Vec<KnownEnvironment> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut tokens = line.split_whitespace().filter(|token| *token != "*");
            let name = tokens.next()?;
            if name.starts_with('/') || name.contains('\\') {
                return None;
            }
            let prefix = tokens.next().map(PathBuf::from);
            Some(KnownEnvironment::new(name, prefix))
        })
        .collect()
}

/// `conda run` でパイプラインのエントリポイントを実行する。
#[derive(Debug, Clone)]
pub struct CondaPipeline {
    program: String,
    entrypoint: Vec<String>,
}

impl CondaPipeline {
    pub fn new(program: impl Into<String>, entrypoint: Vec<String>) -> Self {
        Self {
            program: program.into(),
            entrypoint,
        }
    }

    fn build_command(&self, environment: &Environment, request: &InferenceRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .current_dir(&request.working_dir)
            .args(["run", "--no-capture-output", "--name", environment.name()])
            .args(&self.entrypoint)
            .args(request.arguments());
        command
    }
}

impl PipelineRunner for CondaPipeline {
    fn run(&self, environment: &Environment, request: &InferenceRequest) -> Result<(), AppError> {
        run_checked(&mut self.build_command(environment, request))
            .map_err(|e| AppError::Pipeline { code: e.code() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_LIST: &str = "\
# conda environments:
#
base                  *  /opt/conda
foo2                     /opt/conda/envs/foo2
image2reg                /opt/conda/envs/image2reg
                         /home/user/unnamed-env
";

    fn args_of(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn parse_env_list_reads_names_and_prefixes() {
        let envs = parse_env_list(ENV_LIST);
        assert_eq!(
            envs,
            vec![
                KnownEnvironment::new("base", Some(PathBuf::from("/opt/conda"))),
                KnownEnvironment::new("foo2", Some(PathBuf::from("/opt/conda/envs/foo2"))),
                KnownEnvironment::new(
                    "image2reg",
                    Some(PathBuf::from("/opt/conda/envs/image2reg"))
                ),
            ]
        );
    }

    #[test]
    fn parsed_names_do_not_match_by_substring() {
        let envs = parse_env_list(ENV_LIST);
        assert!(!envs.iter().any(|env| env.name == "foo"));
        assert!(!envs.iter().any(|env| env.name == "image2"));
    }

    #[test]
    fn create_command_pins_python_version() {
        let manager = CondaManager::new("conda", ".");
        let command = manager.create_command(&EnvironmentConfig::default());
        assert_eq!(
            args_of(&command),
            vec!["create", "--yes", "--name", "image2reg", "python=3.8.10"]
        );
    }

    #[test]
    fn install_command_runs_pip_inside_environment() {
        let manager = CondaManager::new("mamba", ".");
        let command = manager.install_command("image2reg", Path::new("requirements.txt"));
        assert_eq!(command.get_program(), "mamba");
        assert_eq!(
            args_of(&command),
            vec![
                "run",
                "--no-capture-output",
                "--name",
                "image2reg",
                "python",
                "-m",
                "pip",
                "install",
                "--requirement",
                "requirements.txt"
            ]
        );
    }

    #[test]
    fn pipeline_command_runs_entrypoint_in_environment() {
        let pipeline = CondaPipeline::new(
            "conda",
            vec!["python".to_string(), "run.py".to_string()],
        );
        let environment = Environment::new("image2reg", None, EnvironmentOrigin::Created);
        let request = InferenceRequest {
            target: "UNKNOWN".to_string(),
            random: true,
            extra_args: Vec::new(),
            working_dir: PathBuf::from("/work"),
        };

        let command = pipeline.build_command(&environment, &request);

        assert_eq!(command.get_current_dir(), Some(Path::new("/work")));
        assert_eq!(
            args_of(&command),
            vec![
                "run",
                "--no-capture-output",
                "--name",
                "image2reg",
                "python",
                "run.py",
                "--target",
                "UNKNOWN",
                "--random"
            ]
        );
    }
}
