//! ワークフローの各ステージ。実行順に並べている。

pub mod environment;
pub mod acquisition;
pub mod inputs;
pub mod pipeline;
pub mod cleanup;
