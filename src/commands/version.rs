use clap::Parser;
use std::fmt::Debug;

const GIT_REVISION: &str = env!("GIT_REVISION");

#[derive(Parser, Debug, Clone)]
#[group(skip)]
pub struct Cmd;

impl Cmd {
    #[allow(clippy::unused_self)]
    pub fn run(&self) {
        println!("soroban-e2e {}", long());
    }
}

pub fn short() -> String {
    format!("{} ({GIT_REVISION})", env!("CARGO_PKG_VERSION"))
}

pub fn long() -> String {
    [
        short(),
        format!("stellar-xdr {}", stellar_xdr::VERSION.pkg),
        format!(
            "network passphrase default {:?}",
            crate::network::STANDALONE_NETWORK_PASSPHRASE
        ),
    ]
    .join("\n")
}
