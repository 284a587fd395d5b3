use image2reg_runner::cli::{self, Invocation};
use image2reg_runner::config::OrchestratorConfig;
use image2reg_runner::external::{CondaManager, CondaPipeline, HttpFetcher};
use image2reg_runner::workflow::{Collaborators, Workflow};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    // 1. コマンドライン引数を解析する
    let run = match cli::resolve(std::env::args_os()) {
        Ok(Invocation::Help(text)) => {
            print!("{}", text);
            return ExitCode::SUCCESS;
        }
        Ok(Invocation::Run(run)) => run,
        Err(e) => return report(&e.to_string(), e.exit_code()),
    };

    // 2. 設定と外部システムを用意する
    let config = match OrchestratorConfig::for_run(&run) {
        Ok(config) => config,
        Err(e) => return report(&e.to_string(), e.exit_code()),
    };
    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => return report(&e.to_string(), e.exit_code()),
    };
    let environments = CondaManager::new(&config.environment.manager, &config.root);
    let pipeline = CondaPipeline::new(
        &config.environment.manager,
        config.pipeline.entrypoint.clone(),
    );

    // 3. ワークフローを実行する
    let workflow = Workflow::new(
        &config,
        Collaborators {
            environments: &environments,
            fetcher: &fetcher,
            pipeline: &pipeline,
        },
    );
    let stdin = io::stdin();
    match workflow.run(&run, &mut stdin.lock(), &mut io::stdout()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(failure) => {
            tracing::error!(stage = %failure.stage, category = ?failure.error.category(), "実行を中止しました");
            report(&failure.to_string(), failure.exit_code())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn report(message: &str, code: i32) -> ExitCode {
    eprintln!("エラー: {}", message);
    exit_code(code)
}

/// 終了コードを 1..=255 に収める。0 は成功と区別できなくなるため 1 にする。
fn exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(0) | Err(_) => ExitCode::from(1),
        Ok(code) => ExitCode::from(code),
    }
}
