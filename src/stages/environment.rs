use crate::config::OrchestratorConfig;
use crate::domain::{Environment, EnvironmentOrigin, RunConfig};
use crate::error::AppError;
use crate::external::EnvironmentManager;
use tracing::info;

/// 実行環境を用意し、有効化する。
///
/// * `--environment` 未指定: 設定された名前で環境を作成し、依存パッケージを入れてから有効化する。
/// * `--environment` 指定: 名前が完全一致する既存環境を探して有効化する。再インストールはしない。
///
/// # 戻り値
/// * `Err(AppError::Provisioning)`: 作成・インストールのいずれかが失敗した場合。
/// * `Err(AppError::EnvironmentNotFound)`: 指定された環境が存在しない場合。
pub fn provision(
    run: &RunConfig,
    config: &OrchestratorConfig,
    manager: &dyn EnvironmentManager,
) -> Result<Environment, AppError> {
    match run.environment_name() {
        Some(name) => reuse(name, manager),
        None => create(config, manager),
    }
}

fn create(
    config: &OrchestratorConfig,
    manager: &dyn EnvironmentManager,
) -> Result<Environment, AppError> {
    let spec = &config.environment;
    manager.create(spec)?;
    manager.install(&spec.name, &config.resolve(&spec.manifest))?;
    let environment = manager
        .activate(&spec.name)?
        .with_origin(EnvironmentOrigin::Created);
    info!(environment = %environment, "新しい環境を構築しました");
    Ok(environment)
}

fn reuse(name: &str, manager: &dyn EnvironmentManager) -> Result<Environment, AppError> {
    if !manager.exists(name)? {
        return Err(AppError::EnvironmentNotFound {
            name: name.to_string(),
        });
    }
    let environment = manager.activate(name)?;
    info!(environment = %environment, "既存の環境を有効化しました");
    Ok(environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEnvironments;

    fn run_with_env(name: Option<&str>) -> RunConfig {
        RunConfig {
            environment_name: name.map(str::to_string),
            ..RunConfig::default()
        }
    }

    #[test]
    fn create_branch_installs_manifest_then_activates() {
        let manager = FakeEnvironments::default();
        let config = OrchestratorConfig::default();

        let env = provision(&run_with_env(None), &config, &manager).unwrap();

        assert_eq!(env.name(), "image2reg");
        assert_eq!(env.origin(), EnvironmentOrigin::Created);
        assert_eq!(
            manager.calls(),
            vec!["create:image2reg", "install:image2reg", "activate:image2reg"]
        );
    }

    #[test]
    fn create_failure_stops_before_install() {
        let manager = FakeEnvironments::failing_create(17);
        let config = OrchestratorConfig::default();

        let err = provision(&run_with_env(None), &config, &manager).unwrap_err();

        assert_eq!(err.exit_code(), 17);
        assert_eq!(manager.calls(), vec!["create:image2reg"]);
    }

    #[test]
    fn reuse_branch_activates_without_reinstalling() {
        let manager = FakeEnvironments::with_known(&["base", "image2reg"]);
        let config = OrchestratorConfig::default();

        let env = provision(&run_with_env(Some("image2reg")), &config, &manager).unwrap();

        assert_eq!(env.origin(), EnvironmentOrigin::Reused);
        assert_eq!(manager.calls(), vec!["list", "activate:image2reg"]);
    }

    #[test]
    fn reuse_branch_requires_exact_name() {
        let manager = FakeEnvironments::with_known(&["foo2", "myfoo"]);
        let config = OrchestratorConfig::default();

        let err = provision(&run_with_env(Some("foo")), &config, &manager).unwrap_err();

        match err {
            AppError::EnvironmentNotFound { name } => assert_eq!(name, "foo"),
            other => panic!("Expected EnvironmentNotFound, got {:?}", other),
        }
        assert_eq!(manager.calls(), vec!["list"]);
    }
}
