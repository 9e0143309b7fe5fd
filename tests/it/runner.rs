use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use httpmock::prelude::*;
use predicates::prelude::*;
use soroban_e2e::wasm::hash_bytes;

use crate::util::{config, funded_network, HELLO_WORLD_ID};

fn runner() -> Command {
    let mut cmd = Command::cargo_bin("soroban-e2e").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A directory with a stand-in contract file; returns it with the file's hash.
fn fake_wasm() -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let bytes = b"\0asm\x01\0\0\0";
    dir.child("hello.wasm").write_binary(bytes).unwrap();
    (dir, hash_bytes(bytes))
}

#[test]
fn version() {
    runner()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("soroban-e2e "));
}

#[test]
fn hash_prints_sha256() {
    let (dir, hash) = fake_wasm();
    runner()
        .arg("hash")
        .arg("--wasm")
        .arg(dir.child("hello.wasm").path())
        .assert()
        .success()
        .stdout(format!("{hash}\n"));
}

#[test]
fn hash_of_missing_wasm_explains_how_to_build() {
    runner()
        .args(["hash", "--wasm", "no/such/contract.wasm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no/such/contract.wasm"))
        .stderr(predicate::str::contains("make build-test-wasms"));
}

#[test]
fn unknown_scenario_is_rejected() {
    runner()
        .args(["run", "upgrade"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'upgrade'"));
}

#[tokio::test]
async fn fund_prints_account() {
    let server = MockServer::start_async().await;
    let config = config(&server.base_url(), &[]);
    funded_network(&server, &config).await;

    runner()
        .args(["fund", "--rpc-url", &config.rpc_url])
        .assert()
        .success()
        .stdout(format!("{}\n", config.account));
}

#[cfg(unix)]
mod with_stand_in_cli {
    use super::*;

    /// Runs `scenarios` with `sh -c <script>` standing in for the CLI. The
    /// script sees `contract` as `$0` and the subcommand as `$1`.
    fn run(rpc_url: &str, wasm: &std::path::Path, script: &str, scenarios: &[&str]) -> Command {
        let mut cmd = runner();
        cmd.args(["-q", "run"])
            .args(scenarios)
            .args(["--rpc-url", rpc_url, "--cli", "sh"])
            .arg(format!("--cli-args=-c '{script}'"))
            .arg("--wasm")
            .arg(wasm);
        cmd
    }

    #[tokio::test]
    async fn install_checks_printed_hash() {
        let server = MockServer::start_async().await;
        let config = config(&server.base_url(), &[]);
        funded_network(&server, &config).await;
        let (dir, hash) = fake_wasm();
        let wasm = dir.child("hello.wasm");

        run(&config.rpc_url, wasm.path(), &format!("echo {hash}"), &["install"])
            .assert()
            .success()
            .stdout("install ... ok\n");

        run(&config.rpc_url, wasm.path(), "echo 0000", &["install"])
            .assert()
            .failure()
            .stdout("install ... FAILED\n")
            .stderr(predicate::str::contains(hash));
    }

    #[tokio::test]
    async fn deploy_checks_last_line() {
        let server = MockServer::start_async().await;
        let config = config(&server.base_url(), &[]);
        funded_network(&server, &config).await;
        let (dir, _) = fake_wasm();
        let wasm = dir.child("hello.wasm");

        run(
            &config.rpc_url,
            wasm.path(),
            &format!("echo deploying; echo {HELLO_WORLD_ID}"),
            &["deploy"],
        )
        .assert()
        .success();

        run(&config.rpc_url, wasm.path(), "echo deployed", &["deploy"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("\"deployed\" (8 bytes)"));
    }

    #[tokio::test]
    async fn install_and_deploy_uses_installed_hash() {
        let server = MockServer::start_async().await;
        let config = config(&server.base_url(), &[]);
        funded_network(&server, &config).await;
        let (dir, hash) = fake_wasm();
        let wasm = dir.child("hello.wasm");
        // $2 and $3 are `--salt 0`.
        let script = format!(
            r#"case "$1" in install) echo {hash};; deploy) if [ "$4 $5" = "--wasm-hash {hash}" ]; then echo deploying; echo {HELLO_WORLD_ID}; else echo "unexpected $*" >&2; exit 1; fi;; esac"#
        );

        run(&config.rpc_url, wasm.path(), &script, &["install-and-deploy"])
            .assert()
            .success()
            .stdout("install-and-deploy ... ok\n");

        let script = format!(r#"if [ "$1" = install ]; then echo {hash}; else echo deployed; fi"#);
        run(&config.rpc_url, wasm.path(), &script, &["install-and-deploy"])
            .assert()
            .failure()
            .stdout("install-and-deploy ... FAILED\n")
            .stderr(predicate::str::contains("\"deployed\" (8 bytes)"));
    }

    #[tokio::test]
    async fn all_scenarios_use_distinct_salts() {
        let server = MockServer::start_async().await;
        let config = config(&server.base_url(), &[]);
        funded_network(&server, &config).await;
        let (dir, hash) = fake_wasm();
        let wasm = dir.child("hello.wasm");
        let deployed = TempDir::new().unwrap();
        let salts = deployed.path().display();
        // Deploy refuses a salt it has seen before, like a real network would.
        let script = format!(
            r#"case "$1" in install) echo {hash};; deploy) if [ -e {salts}/salt-$3 ]; then echo "contract already exists" >&2; exit 1; fi; touch {salts}/salt-$3; echo {HELLO_WORLD_ID};; *) echo "[\"Hello\",\"world\"]";; esac"#
        );

        run(&config.rpc_url, wasm.path(), &script, &[])
            .assert()
            .success()
            .stdout(
                "install ... ok\n\
                 install-and-deploy ... ok\n\
                 deploy ... ok\n\
                 deploy-and-invoke ... ok\n",
            );
        for salt in ["1", "2", "3"] {
            deployed.child(format!("salt-{salt}")).assert(predicate::path::exists());
        }

        // Same salts again: the first deploy collides.
        run(&config.rpc_url, wasm.path(), &script, &[])
            .assert()
            .failure()
            .stdout("install ... ok\ninstall-and-deploy ... FAILED\n")
            .stderr(predicate::str::contains("contract already exists"));
    }

    #[tokio::test]
    async fn deploy_and_invoke_checks_fragment() {
        let server = MockServer::start_async().await;
        let config = config(&server.base_url(), &[]);
        funded_network(&server, &config).await;
        let (dir, _) = fake_wasm();
        let wasm = dir.child("hello.wasm");
        // Deploy prints the id, invoke prints the greeting.
        let script = format!(
            r#"if [ "$1" = deploy ]; then echo {HELLO_WORLD_ID}; else echo "[\"Hello\",\"world\"]"; fi"#
        );

        run(&config.rpc_url, wasm.path(), &script, &["deploy-and-invoke"])
            .assert()
            .success()
            .stdout("deploy-and-invoke ... ok\n");
    }

    #[tokio::test]
    async fn subject_failure_reports_streams() {
        let server = MockServer::start_async().await;
        let config = config(&server.base_url(), &[]);
        funded_network(&server, &config).await;
        let (dir, _) = fake_wasm();
        let wasm = dir.child("hello.wasm");

        run(&config.rpc_url, wasm.path(), "echo boom >&2; exit 2", &["deploy"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("boom"));
    }
}
