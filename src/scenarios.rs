//! The end-to-end scenarios, usable from tests and from the runner binary.
//!
//! Each one drives the CLI against a funded [`Scenario`] and checks what it
//! printed against values the harness works out on its own.

use std::fmt::Display;

use crate::{
    assert,
    cli::quote,
    fixture::{Error, Scenario},
};

/// What `hello --world=world` returns.
pub const HELLO_WORLD_FRAGMENT: &str = r#"["Hello","world"]"#;

/// The contract id is derived from the deployer and the salt, so two deploys
/// from the same account on one network need different salts.
pub const DEFAULT_SALT: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Name {
    Install,
    InstallAndDeploy,
    Deploy,
    DeployAndInvoke,
}

impl Name {
    pub const ALL: [Name; 4] = [
        Name::Install,
        Name::InstallAndDeploy,
        Name::Deploy,
        Name::DeployAndInvoke,
    ];

    /// Runs the scenario, returning the value it checked. `salt` is ignored
    /// by scenarios that do not deploy.
    pub async fn run(self, scenario: &Scenario, salt: u64) -> Result<String, Error> {
        match self {
            Name::Install => install(scenario).await,
            Name::InstallAndDeploy => install_and_deploy(scenario, salt).await,
            Name::Deploy => deploy(scenario, salt).await,
            Name::DeployAndInvoke => deploy_and_invoke(scenario, salt).await,
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Name::Install => "install",
            Name::InstallAndDeploy => "install-and-deploy",
            Name::Deploy => "deploy",
            Name::DeployAndInvoke => "deploy-and-invoke",
        };
        write!(f, "{name}")
    }
}

fn wasm_arg(scenario: &Scenario) -> Result<String, Error> {
    let path = scenario.wasm().path()?;
    Ok(quote(&path.to_string_lossy())?.into_owned())
}

/// Installs the contract; the CLI must print the same hash the harness
/// computes from the file.
pub async fn install(scenario: &Scenario) -> Result<String, Error> {
    let hash = scenario.wasm().hash()?;
    let stdout = scenario
        .run_successful(&format!("contract install --wasm {}", wasm_arg(scenario)?))
        .await?;
    assert::contains_hash(&stdout, &hash)?;
    tracing::info!(%hash, "installed");
    Ok(hash)
}

/// Installs, then deploys the installed code by its hash.
pub async fn install_and_deploy(scenario: &Scenario, salt: u64) -> Result<String, Error> {
    let hash = install(scenario).await?;
    let stdout = scenario
        .run_successful(&format!(
            "contract deploy --salt {salt:x} --wasm-hash {hash}"
        ))
        .await?;
    let id = assert::contract_id(&stdout)?.to_string();
    tracing::info!(%id, "deployed");
    Ok(id)
}

/// Deploys straight from the wasm file.
pub async fn deploy(scenario: &Scenario, salt: u64) -> Result<String, Error> {
    let stdout = scenario
        .run_successful(&format!(
            "contract deploy --salt {salt:x} --wasm {}",
            wasm_arg(scenario)?
        ))
        .await?;
    let id = assert::contract_id(&stdout)?.to_string();
    tracing::info!(%id, "deployed");
    Ok(id)
}

/// Deploys, then calls `hello` twice with the same argument. Both calls must
/// print the same greeting.
pub async fn deploy_and_invoke(scenario: &Scenario, salt: u64) -> Result<String, Error> {
    let id = deploy(scenario, salt).await?;
    let cmd = format!("contract invoke --id {id} -- hello --world=world");
    for _ in 0..2 {
        let stdout = scenario.run_successful(&cmd).await?;
        assert::contains_fragment(&stdout, HELLO_WORLD_FRAGMENT)?;
    }
    tracing::info!(%id, fragment = HELLO_WORLD_FRAGMENT, "invoked");
    Ok(HELLO_WORLD_FRAGMENT.to_string())
}
