use std::path::PathBuf;

use clap::Parser;

use crate::{
    config::DEFAULT_WASM,
    wasm::{self, Wasm},
};

#[derive(Parser, Debug, Clone)]
#[group(skip)]
pub struct Cmd {
    /// Contract to hash
    #[arg(long, env = "SOROBAN_E2E_WASM", default_value = DEFAULT_WASM)]
    pub wasm: PathBuf,
}

impl Cmd {
    pub fn run(&self) -> Result<(), wasm::Error> {
        println!("{}", Wasm(&self.wasm).hash()?);
        Ok(())
    }
}
