use std::{
    str::FromStr,
    time::{Duration, Instant},
};

use http::{uri::Authority, Uri};
use jsonrpsee_core::{client::ClientT, params::ObjectParams, rpc_params, traits::ToRpcParams};
use jsonrpsee_http_client::{HeaderMap, HeaderValue, HttpClient, HttpClientBuilder};
use serde::de::DeserializeOwned;
use serde_aux::prelude::deserialize_number_from_string;
use stellar_xdr::curr::{
    AccountEntry, LedgerEntryData, LedgerKey, LedgerKeyAccount, Limits, ReadXdr,
    TransactionEnvelope, TransactionResult, WriteXdr,
};

use crate::network;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Per-request limit; the poll loop bounds the overall wait.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid rpc url: {0}")]
    InvalidRpcUrl(http::uri::InvalidUri),
    #[error("invalid rpc url: {0}")]
    InvalidRpcUrlFromUriParts(http::uri::InvalidUriParts),
    #[error("{method} request to {url} failed after {elapsed:?}: {error}")]
    Transport {
        method: &'static str,
        url: String,
        elapsed: Duration,
        error: jsonrpsee_core::Error,
    },
    #[error("xdr processing error: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),
    #[error("json encoding error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Network(#[from] network::Error),
    #[error("provided network passphrase {expected:?} does not match the server: {server:?}")]
    InvalidNetworkPassphrase { expected: String, server: String },
    #[error("{0} not found: {1}")]
    NotFound(String, String),
    #[error("invalid response from server")]
    InvalidResponse,
    #[error("unexpected transaction status: {0}")]
    UnexpectedTransactionStatus(String),
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
pub struct GetNetworkResponse {
    #[serde(
        rename = "friendbotUrl",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub friendbot_url: Option<String>,
    pub passphrase: String,
    #[serde(
        rename = "protocolVersion",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub protocol_version: u32,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
pub struct LedgerEntryResult {
    pub key: String,
    pub xdr: String,
    #[serde(
        rename = "lastModifiedLedgerSeq",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub last_modified_ledger: u32,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
pub struct GetLedgerEntriesResponse {
    pub entries: Option<Vec<LedgerEntryResult>>,
    #[serde(
        rename = "latestLedger",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub latest_ledger: u32,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
pub struct SendTransactionResponse {
    pub hash: String,
    pub status: String,
    #[serde(
        rename = "errorResultXdr",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub error_result_xdr: Option<String>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
pub struct GetTransactionResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ledger: Option<u32>,
    #[serde(rename = "resultXdr", skip_serializing_if = "Option::is_none", default)]
    pub result_xdr: Option<String>,
    #[serde(
        rename = "envelopeXdr",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub envelope_xdr: Option<String>,
}

/// What the node reports about a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl GetTransactionResponse {
    pub fn status(&self) -> Result<TransactionStatus, Error> {
        match self.status.as_str() {
            // older servers report in-flight transactions as PENDING
            "NOT_FOUND" | "PENDING" => Ok(TransactionStatus::Pending),
            "SUCCESS" => Ok(TransactionStatus::Success),
            "FAILED" => Ok(TransactionStatus::Failed),
            _ => Err(Error::UnexpectedTransactionStatus(self.status.clone())),
        }
    }

    /// Human readable result code, decoded from `resultXdr` when possible.
    pub fn result_detail(&self) -> String {
        describe_result(self.result_xdr.as_deref())
    }
}

impl SendTransactionResponse {
    pub fn error_detail(&self) -> String {
        describe_result(self.error_result_xdr.as_deref())
    }
}

fn describe_result(result_xdr: Option<&str>) -> String {
    match result_xdr {
        None => "no result returned".to_string(),
        Some(xdr) => match TransactionResult::from_xdr_base64(xdr, Limits::none()) {
            Ok(res) => format!("{:?}", res.result),
            Err(_) => xdr.to_string(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        // jsonrpsee requires a port to always be present, so add the scheme
        // default when the url leaves it out.
        let uri = base_url.parse::<Uri>().map_err(Error::InvalidRpcUrl)?;
        let mut parts = uri.into_parts();
        if let (Some(scheme), Some(authority)) = (&parts.scheme, &parts.authority) {
            if authority.port().is_none() {
                let port = match scheme.as_str() {
                    "http" => Some(80),
                    "https" => Some(443),
                    _ => None,
                };
                if let Some(port) = port {
                    let host = authority.host();
                    parts.authority = Some(
                        Authority::from_str(&format!("{host}:{port}"))
                            .map_err(Error::InvalidRpcUrl)?,
                    );
                }
            }
        }
        let uri = Uri::from_parts(parts).map_err(Error::InvalidRpcUrlFromUriParts)?;
        tracing::trace!(?uri);
        Ok(Self {
            base_url: uri.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn client(&self) -> Result<HttpClient, Error> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Client-Name", HeaderValue::from_static("soroban-e2e"));
        headers.insert(
            "X-Client-Version",
            HeaderValue::from_static(VERSION.unwrap_or("devel")),
        );
        HttpClientBuilder::default()
            .set_headers(headers)
            .request_timeout(self.timeout)
            .build(&self.base_url)
            .map_err(|error| Error::Transport {
                method: "connect",
                url: self.base_url.clone(),
                elapsed: Duration::ZERO,
                error,
            })
    }

    async fn request<R, P>(&self, method: &'static str, params: P) -> Result<R, Error>
    where
        R: DeserializeOwned,
        P: ToRpcParams + Send,
    {
        let client = self.client()?;
        let start = Instant::now();
        client
            .request(method, params)
            .await
            .map_err(|error| Error::Transport {
                method,
                url: self.base_url.clone(),
                elapsed: start.elapsed(),
                error,
            })
    }

    pub async fn get_network(&self) -> Result<GetNetworkResponse, Error> {
        tracing::trace!("Getting network");
        self.request("getNetwork", rpc_params![]).await
    }

    pub async fn verify_network_passphrase(&self, expected: Option<&str>) -> Result<String, Error> {
        let server = self.get_network().await?.passphrase;
        match expected {
            Some(expected) if expected != server => Err(Error::InvalidNetworkPassphrase {
                expected: expected.to_string(),
                server,
            }),
            _ => Ok(server),
        }
    }

    pub async fn get_ledger_entries(
        &self,
        keys: &[LedgerKey],
    ) -> Result<GetLedgerEntriesResponse, Error> {
        let keys = keys
            .iter()
            .map(|k| k.to_xdr_base64(Limits::none()))
            .collect::<Result<Vec<_>, _>>()?;
        let mut params = ObjectParams::new();
        params.insert("keys", keys)?;
        self.request("getLedgerEntries", params).await
    }

    pub async fn get_account(&self, address: &str) -> Result<AccountEntry, Error> {
        tracing::trace!("Getting address {}", address);
        let key = account_key(address)?;
        let response = self.get_ledger_entries(&[key]).await?;
        let entries = response.entries.unwrap_or_default();
        let Some(entry) = entries.first() else {
            return Err(Error::NotFound("Account".to_string(), address.to_string()));
        };
        if let LedgerEntryData::Account(account) =
            LedgerEntryData::from_xdr_base64(&entry.xdr, Limits::none())?
        {
            tracing::trace!(account=?account);
            Ok(account)
        } else {
            Err(Error::InvalidResponse)
        }
    }

    /// Submits an envelope once. The returned status is the node's admission
    /// decision, not the transaction outcome.
    pub async fn send_transaction(
        &self,
        tx: &TransactionEnvelope,
    ) -> Result<SendTransactionResponse, Error> {
        tracing::trace!(?tx);
        let mut params = ObjectParams::new();
        params.insert("transaction", tx.to_xdr_base64(Limits::none())?)?;
        let response: SendTransactionResponse = self.request("sendTransaction", params).await?;
        tracing::trace!(?response);
        Ok(response)
    }

    pub async fn get_transaction(&self, hash: &str) -> Result<GetTransactionResponse, Error> {
        let mut params = ObjectParams::new();
        params.insert("hash", hash)?;
        let response: GetTransactionResponse = self.request("getTransaction", params).await?;
        tracing::trace!(?response);
        Ok(response)
    }
}

pub fn account_key(address: &str) -> Result<LedgerKey, Error> {
    Ok(LedgerKey::Account(LedgerKeyAccount {
        account_id: network::account_id(address)?,
    }))
}
