use crate::domain::{Environment, RunConfig};
use crate::error::AppError;
use crate::external::{InferenceRequest, PipelineRunner};
use std::path::Path;
use tracing::info;

/// 推論パイプラインを実行し、終了を待つ。
///
/// サポート外のターゲットが指定された場合は実行せずにエラーを返す。
/// パイプラインの出力は解釈せず、終了コードだけを伝える。
pub fn invoke(
    run: &RunConfig,
    environment: &Environment,
    runner: &dyn PipelineRunner,
    working_dir: &Path,
) -> Result<(), AppError> {
    if !run.has_supported_target() {
        return Err(AppError::InvalidTarget(run.target().to_string()));
    }

    let request = InferenceRequest {
        target: run.target().to_string(),
        random: run.random(),
        extra_args: run.passthrough().to_vec(),
        working_dir: working_dir.to_path_buf(),
    };
    info!(inference_target = %request.target, random = request.random, environment = %environment, "推論パイプラインを開始します");
    runner.run(environment, &request)?;
    info!("推論パイプラインが完了しました");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnvironmentOrigin;
    use crate::testing::FakePipeline;

    fn environment() -> Environment {
        Environment::new("image2reg", None, EnvironmentOrigin::Created)
    }

    #[test]
    fn unknown_target_is_forwarded_with_flags() {
        let pipeline = FakePipeline::default();
        let run = RunConfig {
            random: true,
            passthrough: vec!["--debug".to_string()],
            ..RunConfig::default()
        };

        invoke(&run, &environment(), &pipeline, Path::new("/work")).unwrap();

        let requests = pipeline.requests();
        assert_eq!(requests.len(), 1);
        let (env_name, request) = &requests[0];
        assert_eq!(env_name, "image2reg");
        assert_eq!(request.target, "UNKNOWN");
        assert!(request.random);
        assert_eq!(request.extra_args, vec!["--debug"]);
        assert_eq!(request.working_dir, Path::new("/work"));
    }

    #[test]
    fn other_targets_are_rejected_without_running() {
        let pipeline = FakePipeline::default();
        let run = RunConfig {
            target: "BRAF".to_string(),
            ..RunConfig::default()
        };

        let err = invoke(&run, &environment(), &pipeline, Path::new(".")).unwrap_err();

        match err {
            AppError::InvalidTarget(target) => assert_eq!(target, "BRAF"),
            other => panic!("Expected InvalidTarget, got {:?}", other),
        }
        assert!(pipeline.requests().is_empty());
    }

    #[test]
    fn pipeline_exit_code_is_propagated() {
        let pipeline = FakePipeline::failing(9);

        let err = invoke(&RunConfig::default(), &environment(), &pipeline, Path::new("."))
            .unwrap_err();

        assert_eq!(err.exit_code(), 9);
    }
}
