use clap::Parser;

use crate::{
    config::Config,
    fixture::{self, fund_account, Funding},
    rpc,
};

#[derive(Parser, Debug, Clone)]
#[group(skip)]
pub struct Cmd {
    #[command(flatten)]
    pub config: Config,
}

impl Cmd {
    pub async fn run(&self) -> Result<(), fixture::Error> {
        let client = rpc::Client::new(&self.config.rpc_url)?;
        let funding = fund_account(&self.config, &client)
            .await
            .map_err(|error| fixture::Error::Funding {
                account: self.config.account.clone(),
                error,
            })?;
        if let Funding::Created { hash, .. } = &funding {
            tracing::debug!(%hash);
        }
        println!("{}", self.config.account);
        Ok(())
    }
}
