use clap::{CommandFactory, FromArgMatches, Parser};

pub mod fund;
pub mod global;
pub mod hash;
pub mod run;
pub mod version;

pub const HEADING_GLOBAL: &str = "Options (Global)";

const ABOUT: &str = "Run Soroban CLI scenarios end to end against an RPC server";

#[derive(Parser, Debug)]
#[command(
    name = "soroban-e2e",
    about = ABOUT,
    version = version::short(),
    long_version = version::long(),
    disable_help_subcommand = true,
)]
pub struct Root {
    #[clap(flatten)]
    pub global_args: global::Args,

    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Root {
    pub fn new() -> Result<Self, clap::Error> {
        let mut matches = Self::command().get_matches();
        Self::from_arg_matches_mut(&mut matches)
    }

    pub fn from_arg_matches<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::from_arg_matches_mut(&mut Self::command().try_get_matches_from(itr)?)
    }

    pub async fn run(&self) -> Result<(), crate::Error> {
        match &self.cmd {
            Cmd::Fund(fund) => fund.run().await?,
            Cmd::Run(run) => run.run().await?,
            Cmd::Hash(hash) => hash.run()?,
            Cmd::Version(version) => version.run(),
        };
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub enum Cmd {
    /// Create the account the CLI signs with, then exit
    Fund(fund::Cmd),
    /// Fund the account and run scenarios against the CLI
    Run(run::Cmd),
    /// Print the SHA-256 of the contract the scenarios install
    Hash(hash::Cmd),
    /// Print version information
    Version(version::Cmd),
}
