use std::time::Instant;

use clap::Parser;

use crate::{
    config::Config,
    fixture::{self, Scenario},
    scenarios::{Name, DEFAULT_SALT},
};

#[derive(Parser, Debug, Clone)]
#[group(skip)]
pub struct Cmd {
    #[command(flatten)]
    pub config: Config,

    /// Scenarios to run, in order. Runs all of them when none are given.
    #[arg(value_enum)]
    pub scenarios: Vec<Name>,

    /// Salt of the first deploy. Each following scenario uses the next one, so
    /// no two scenarios deploy to the same contract id.
    #[arg(long, env = "SOROBAN_E2E_SALT", default_value_t = DEFAULT_SALT)]
    pub salt: u64,
}

impl Cmd {
    pub fn scenarios(&self) -> Vec<Name> {
        if self.scenarios.is_empty() {
            Name::ALL.to_vec()
        } else {
            self.scenarios.clone()
        }
    }

    /// Pairs each scenario with the salt it deploys with.
    pub fn plan(&self) -> Vec<(Name, u64)> {
        (self.salt..)
            .zip(self.scenarios())
            .map(|(salt, name)| (name, salt))
            .collect()
    }

    pub async fn run(&self) -> Result<(), fixture::Error> {
        let scenario = Scenario::new(self.config.clone()).await?;
        for (name, salt) in self.plan() {
            let start = Instant::now();
            match name.run(&scenario, salt).await {
                Ok(checked) => {
                    tracing::info!(%name, salt, %checked, elapsed = ?start.elapsed(), "passed");
                    println!("{name} ... ok");
                }
                Err(e) => {
                    tracing::error!(%name, salt, elapsed = ?start.elapsed(), "failed");
                    println!("{name} ... FAILED");
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
