#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_panics_doc
)]
pub mod assert;
pub mod cli;
pub mod commands;
pub mod config;
pub mod fixture;
pub mod network;
pub mod rpc;
pub mod scenarios;
pub mod txn;
pub mod wasm;

pub use commands::Root;
pub use config::Config;
pub use fixture::Scenario;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] clap::Error),
    #[error(transparent)]
    Network(#[from] network::Error),
    #[error(transparent)]
    Rpc(#[from] rpc::Error),
    #[error(transparent)]
    Txn(#[from] txn::Error),
    #[error(transparent)]
    Cli(#[from] cli::Error),
    #[error(transparent)]
    Assert(#[from] assert::Error),
    #[error(transparent)]
    Wasm(#[from] wasm::Error),
    #[error(transparent)]
    Scenario(#[from] fixture::Error),
}
