pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod external;
pub mod stages;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
