use clap::Parser;
use httpmock::{prelude::*, Mock};
use serde_json::{json, Value};
use soroban_e2e::{
    config::Config,
    network::{self, STANDALONE_NETWORK_PASSPHRASE},
    rpc,
    txn::{self, Account, Builder, CreateAccount},
};
use stellar_xdr::curr::{
    AccountEntry, AccountEntryExt, LedgerEntryData, Limits, SequenceNumber, String32, StringM,
    Thresholds, TransactionEnvelope, VecM, WriteXdr,
};

pub const HELLO_WORLD_ID: &str = "CAS3J7GYLGXMF6TDJBBYYSE3HQ6BBSMLNUQ34T6TZMYMW2EVH34XOWMA";
pub const TX_HASH: &str = "3389e9f0f1a65f19736cacf544c2e825313e8447f569233bb8db39aa607c8889";

#[derive(Parser)]
#[command(no_binary_name = true)]
struct Flags {
    #[command(flatten)]
    config: Config,
}

/// Config pointing at `rpc_url` with short poll timings, plus any extra flags.
pub fn config(rpc_url: &str, extra: &[&str]) -> Config {
    let mut args = vec![
        "--rpc-url",
        rpc_url,
        "--network-passphrase",
        STANDALONE_NETWORK_PASSPHRASE,
        "--poll-interval",
        "20ms",
        "--tx-timeout",
        "500ms",
    ];
    args.extend_from_slice(extra);
    Flags::parse_from(args).config
}

pub fn root_address() -> String {
    network::address(&network::root_key(STANDALONE_NETWORK_PASSPHRASE)).to_string()
}

/// The envelope the fixture is expected to submit when the root account is
/// at `root_sequence`.
pub fn funding_envelope(config: &Config, root_sequence: i64) -> TransactionEnvelope {
    let key = network::root_key(&config.network_passphrase);
    let source = Account::new(root_address(), root_sequence);
    let tx = Builder::new(&source)
        .operation(
            CreateAccount::new(&config.account, config.starting_balance_stroops()).unwrap(),
        )
        .build()
        .unwrap();
    txn::sign(tx, &key, &config.network_passphrase).unwrap()
}

fn account_entry(address: &str, sequence: i64) -> String {
    LedgerEntryData::Account(AccountEntry {
        account_id: network::account_id(address).unwrap(),
        balance: 1_000_000_000,
        seq_num: SequenceNumber(sequence),
        num_sub_entries: 0,
        inflation_dest: None,
        flags: 0,
        home_domain: String32(StringM::default()),
        thresholds: Thresholds([1, 0, 0, 0]),
        signers: VecM::default(),
        ext: AccountEntryExt::V0,
    })
    .to_xdr_base64(Limits::none())
    .unwrap()
}

fn result(result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 0,
        "result": result,
    })
}

fn request(method: &str, params: Option<Value>) -> String {
    let mut body = json!({ "jsonrpc": "2.0", "method": method });
    if let Some(params) = params {
        body["params"] = params;
    }
    body.to_string()
}

pub async fn mock_get_network<'a>(server: &'a MockServer, passphrase: &str) -> Mock<'a> {
    let response = result(json!({
        "passphrase": passphrase,
        "protocolVersion": 21,
    }));
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .json_body_partial(request("getNetwork", None));
            then.status(200).json_body(response);
        })
        .await
}

/// Answers `getLedgerEntries` for `address`. `None` reports no entry.
pub async fn mock_account<'a>(
    server: &'a MockServer,
    address: &str,
    sequence: Option<i64>,
) -> Mock<'a> {
    let key = rpc::account_key(address)
        .unwrap()
        .to_xdr_base64(Limits::none())
        .unwrap();
    let entries = match sequence {
        Some(sequence) => json!([{
            "key": key,
            "xdr": account_entry(address, sequence),
            "lastModifiedLedgerSeq": "2",
        }]),
        None => json!([]),
    };
    let response = result(json!({ "entries": entries, "latestLedger": 10 }));
    server
        .mock_async(|when, then| {
            when.method(POST).path("/").json_body_partial(request(
                "getLedgerEntries",
                Some(json!({ "keys": [key] })),
            ));
            then.status(200).json_body(response);
        })
        .await
}

/// Answers `sendTransaction` with `status`. When `envelope` is given only that
/// exact transaction matches.
pub async fn mock_send<'a>(
    server: &'a MockServer,
    status: &str,
    envelope: Option<&TransactionEnvelope>,
) -> Mock<'a> {
    let params = envelope
        .map(|e| json!({ "transaction": e.to_xdr_base64(Limits::none()).unwrap() }));
    let mut response = json!({ "hash": TX_HASH, "status": status });
    if status == "ERROR" {
        // txBAD_SEQ
        response["errorResultXdr"] = json!("AAAAAAAAAGT////7AAAAAA==");
    }
    let response = result(response);
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .json_body_partial(request("sendTransaction", params));
            then.status(200).json_body(response);
        })
        .await
}

pub async fn mock_get_transaction<'a>(server: &'a MockServer, status: &str) -> Mock<'a> {
    let mut response = json!({ "status": status, "latestLedger": 20 });
    if status == "SUCCESS" || status == "FAILED" {
        response["ledger"] = json!(19);
    }
    let response = result(response);
    server
        .mock_async(|when, then| {
            when.method(POST).path("/").json_body_partial(request(
                "getTransaction",
                Some(json!({ "hash": TX_HASH })),
            ));
            then.status(200).json_body(response);
        })
        .await
}

/// A network where the default account already exists, so funding submits
/// nothing.
pub async fn funded_network(server: &MockServer, config: &Config) {
    mock_get_network(server, STANDALONE_NETWORK_PASSPHRASE).await;
    mock_account(server, &config.account, Some(1)).await;
}
