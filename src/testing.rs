//! テスト用の外部システムの偽物。呼び出しを記録するだけで、外部コマンドは実行しない。

use crate::config::EnvironmentConfig;
use crate::domain::bundle_archive::write_test_zip;
use crate::domain::{Environment, EnvironmentOrigin, KnownEnvironment};
use crate::error::{AcquisitionError, AppError};
use crate::external::{BundleFetcher, EnvironmentManager, InferenceRequest, PipelineRunner};
use std::cell::RefCell;
use std::path::Path;

#[derive(Default)]
pub(crate) struct FakeEnvironments {
    known: RefCell<Vec<KnownEnvironment>>,
    calls: RefCell<Vec<String>>,
    create_failure: Option<i32>,
}

impl FakeEnvironments {
    pub fn with_known(names: &[&str]) -> Self {
        Self {
            known: RefCell::new(
                names
                    .iter()
                    .map(|name| KnownEnvironment::new(*name, None))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn failing_create(code: i32) -> Self {
        Self {
            create_failure: Some(code),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl EnvironmentManager for FakeEnvironments {
    fn list(&self) -> Result<Vec<KnownEnvironment>, AppError> {
        self.record("list".to_string());
        Ok(self.known.borrow().clone())
    }

    fn create(&self, spec: &EnvironmentConfig) -> Result<(), AppError> {
        self.record(format!("create:{}", spec.name));
        if let Some(code) = self.create_failure {
            return Err(AppError::Provisioning {
                step: "create".to_string(),
                code,
            });
        }
        self.known
            .borrow_mut()
            .push(KnownEnvironment::new(spec.name.clone(), None));
        Ok(())
    }

    fn install(&self, name: &str, _manifest: &Path) -> Result<(), AppError> {
        self.record(format!("install:{}", name));
        Ok(())
    }

    fn activate(&self, name: &str) -> Result<Environment, AppError> {
        self.record(format!("activate:{}", name));
        let known = self.known.borrow();
        known
            .iter()
            .find(|env| env.name == name)
            .map(|env| Environment::new(env.name.clone(), None, EnvironmentOrigin::Reused))
            .ok_or_else(|| AppError::EnvironmentNotFound {
                name: name.to_string(),
            })
    }
}

/// 呼ばれるたびに固定内容のZIPを書き出す。
pub(crate) struct FakeFetcher {
    entries: Vec<(String, Vec<u8>)>,
    fail: bool,
    calls: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn serving(entries: &[(&str, &[u8])]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, bytes)| (name.to_string(), bytes.to_vec()))
                .collect(),
            fail: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// `resources/` を最上位に持つ典型的なバンドル。
    pub fn resources_bundle() -> Self {
        Self::serving(&[
            ("resources/", b""),
            ("resources/models/", b""),
            ("resources/models/encoder.pth", b"weights"),
        ])
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::serving(&[])
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl BundleFetcher for FakeFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), AppError> {
        self.calls.borrow_mut().push(url.to_string());
        if self.fail {
            return Err(AcquisitionError::Download {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            }
            .into());
        }
        let entries: Vec<(&str, &[u8])> = self
            .entries
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
            .collect();
        write_test_zip(destination, &entries);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakePipeline {
    exit_code: Option<i32>,
    requests: RefCell<Vec<(String, InferenceRequest)>>,
}

impl FakePipeline {
    pub fn failing(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    /// (環境名, 依頼内容) の記録。
    pub fn requests(&self) -> Vec<(String, InferenceRequest)> {
        self.requests.borrow().clone()
    }
}

impl PipelineRunner for FakePipeline {
    fn run(&self, environment: &Environment, request: &InferenceRequest) -> Result<(), AppError> {
        self.requests
            .borrow_mut()
            .push((environment.name().to_string(), request.clone()));
        match self.exit_code {
            Some(code) => Err(AppError::Pipeline { code }),
            None => Ok(()),
        }
    }
}
