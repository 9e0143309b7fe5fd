use crate::{
    assert,
    cli::{self, Cli, Invocation},
    config::Config,
    network, rpc,
    txn::{self, Account, Builder, CreateAccount, Submitter},
    wasm::{self, Wasm},
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] clap::Error),
    #[error("setting up {account}: {error}")]
    Funding { account: String, error: txn::Error },
    #[error(transparent)]
    Rpc(#[from] rpc::Error),
    #[error(transparent)]
    Cli(#[from] cli::Error),
    #[error(transparent)]
    Assert(#[from] assert::Error),
    #[error(transparent)]
    Wasm(#[from] wasm::Error),
}

/// What the fixture had to do to make the account exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Funding {
    Created { hash: String, ledger: Option<u32> },
    /// An earlier scenario on the same network funded it already.
    AlreadyExists,
}

/// Creates `config.account` with `config.starting_balance` XLM, paid for by the
/// network root account. Nothing is submitted when the account already exists.
pub async fn fund_account(config: &Config, client: &rpc::Client) -> Result<Funding, txn::Error> {
    client
        .verify_network_passphrase(Some(&config.network_passphrase))
        .await?;

    match client.get_account(&config.account).await {
        Ok(_) => {
            tracing::info!(account = %config.account, "account already exists");
            return Ok(Funding::AlreadyExists);
        }
        Err(rpc::Error::NotFound(..)) => (),
        Err(e) => return Err(e.into()),
    }

    let key = network::root_key(&config.network_passphrase);
    let root = network::address(&key).to_string();
    let entry = client.get_account(&root).await?;
    let source = Account::new(root, entry.seq_num.0);

    let tx = Builder::new(&source)
        .operation(CreateAccount::new(
            &config.account,
            config.starting_balance_stroops(),
        )?)
        .build()?;
    let hash = hex::encode(txn::transaction_hash(&tx, &config.network_passphrase)?);
    let envelope = txn::sign(tx, &key, &config.network_passphrase)?;

    let response = Submitter::new(client)
        .poll_interval(config.poll_interval)
        .timeout(config.tx_timeout)
        .submit(&envelope)
        .await?;
    tracing::info!(
        account = %config.account,
        balance = config.starting_balance,
        %hash,
        ledger = ?response.ledger,
        "account created"
    );
    Ok(Funding::Created {
        hash,
        ledger: response.ledger,
    })
}

/// One end-to-end run against a live network. Constructing it funds the
/// account the CLI signs with; dropping it is the teardown.
#[derive(Debug)]
pub struct Scenario {
    pub config: Config,
    pub client: rpc::Client,
    pub cli: Cli,
    pub funding: Funding,
}

impl Scenario {
    pub async fn new(config: Config) -> Result<Self, Error> {
        let client = rpc::Client::new(&config.rpc_url)?;
        let cli = Cli::new(&config)?;
        let funding = fund_account(&config, &client)
            .await
            .map_err(|error| Error::Funding {
                account: config.account.clone(),
                error,
            })?;
        Ok(Self {
            config,
            client,
            cli,
            funding,
        })
    }

    pub async fn from_env() -> Result<Self, Error> {
        Self::new(Config::from_env()?).await
    }

    pub fn wasm(&self) -> Wasm<'_> {
        Wasm(&self.config.wasm)
    }

    /// Runs `cmd` through the CLI, whatever its exit status.
    pub async fn run(&self, cmd: &str) -> Result<Invocation, Error> {
        Ok(self.cli.run(cmd).await?)
    }

    /// Runs `cmd` and returns its stdout, failing on a non-zero exit.
    pub async fn run_successful(&self, cmd: &str) -> Result<String, Error> {
        let invocation = self.run(cmd).await?;
        Ok(assert::success(&invocation)?.to_string())
    }
}
