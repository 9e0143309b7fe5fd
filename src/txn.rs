use std::time::{Duration, Instant};

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    self as xdr, DecoratedSignature, Limits, Memo, Preconditions, SequenceNumber, Signature,
    SignatureHint, TimeBounds, TimePoint, Transaction, TransactionEnvelope, TransactionExt,
    TransactionSignaturePayload, TransactionSignaturePayloadTaggedTransaction,
    TransactionV1Envelope, WriteXdr,
};
use tokio::time::sleep;

use crate::{
    network::{self, MIN_BASE_FEE},
    rpc::{self, GetTransactionResponse, TransactionStatus},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of operations in a single transaction.
const MAX_OPERATIONS: usize = 100;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("transaction has no operations")]
    NoOperations,
    #[error("transaction contains too many operations ({0})")]
    TooManyOperations(usize),
    #[error("base fee {fee} is below the network minimum of {MIN_BASE_FEE}")]
    FeeTooLow { fee: u32 },
    #[error("memo {0:?} is longer than 28 bytes")]
    MemoTooLong(String),
    #[error(transparent)]
    Network(#[from] network::Error),
    #[error("xdr processing error: {0}")]
    Xdr(#[from] xdr::Error),
    #[error(transparent)]
    Rpc(#[from] rpc::Error),
    #[error("transaction {hash} rejected on submission ({status}): {reason}")]
    Rejected {
        hash: String,
        status: String,
        reason: String,
    },
    #[error("transaction {hash} failed in ledger {ledger:?}: {reason}")]
    Failed {
        hash: String,
        ledger: Option<u32>,
        reason: String,
    },
    #[error("transaction {hash} still pending at {url} after {elapsed:?}")]
    Timeout {
        hash: String,
        url: String,
        elapsed: Duration,
    },
}

/// An account the harness signs for, with its last consumed sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
    pub sequence: i64,
}

impl Account {
    pub fn new(address: impl Into<String>, sequence: i64) -> Self {
        Self {
            address: address.into(),
            sequence,
        }
    }

    pub fn next_sequence(&self) -> i64 {
        self.sequence + 1
    }

    /// Records that the next sequence number was consumed on-chain.
    pub fn bump(&mut self) {
        self.sequence += 1;
    }
}

pub trait Operation {
    fn build_body(self) -> xdr::OperationBody;

    fn build_op(self) -> xdr::Operation
    where
        Self: Sized,
    {
        xdr::Operation {
            source_account: None,
            body: self.build_body(),
        }
    }
}

pub struct CreateAccount {
    pub destination: xdr::AccountId,
    pub starting_balance: i64,
}

impl CreateAccount {
    pub fn new(destination: &str, starting_balance: i64) -> Result<Self, Error> {
        Ok(Self {
            destination: network::account_id(destination)?,
            starting_balance,
        })
    }
}

impl Operation for CreateAccount {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::CreateAccount(xdr::CreateAccountOp {
            destination: self.destination,
            starting_balance: self.starting_balance,
        })
    }
}

pub struct Builder<'a> {
    source: &'a Account,
    fee: u32,
    operations: Vec<xdr::Operation>,
    memo: Option<String>,
    time_bounds: Option<TimeBounds>,
}

impl<'a> Builder<'a> {
    pub fn new(source: &'a Account) -> Self {
        Self {
            source,
            fee: MIN_BASE_FEE,
            operations: Vec::new(),
            memo: None,
            time_bounds: None,
        }
    }

    #[must_use]
    pub fn base_fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    #[must_use]
    pub fn operation(mut self, op: impl Operation) -> Self {
        self.operations.push(op.build_op());
        self
    }

    #[must_use]
    pub fn memo_text(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Restricts validity to `[min, max]` unix seconds. Without this the
    /// transaction never expires.
    #[must_use]
    pub fn time_bounds(mut self, min: u64, max: u64) -> Self {
        self.time_bounds = Some(TimeBounds {
            min_time: TimePoint(min),
            max_time: TimePoint(max),
        });
        self
    }

    pub fn build(self) -> Result<Transaction, Error> {
        if self.operations.is_empty() {
            return Err(Error::NoOperations);
        }
        if self.operations.len() > MAX_OPERATIONS {
            return Err(Error::TooManyOperations(self.operations.len()));
        }
        if self.fee < MIN_BASE_FEE {
            return Err(Error::FeeTooLow { fee: self.fee });
        }
        let memo = match self.memo {
            None => Memo::None,
            Some(text) => Memo::Text(
                text.as_bytes()
                    .to_vec()
                    .try_into()
                    .map_err(|_| Error::MemoTooLong(text.clone()))?,
            ),
        };
        let time_bounds = self.time_bounds.unwrap_or(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(0),
        });
        let op_count = u32::try_from(self.operations.len())
            .map_err(|_| Error::TooManyOperations(self.operations.len()))?;
        Ok(Transaction {
            source_account: network::muxed_account(&self.source.address)?,
            fee: self.fee.saturating_mul(op_count),
            seq_num: SequenceNumber(self.source.next_sequence()),
            cond: Preconditions::Time(time_bounds),
            memo,
            operations: self.operations.try_into()?,
            ext: TransactionExt::V0,
        })
    }
}

pub fn transaction_hash(tx: &Transaction, network_passphrase: &str) -> Result<[u8; 32], Error> {
    let signature_payload = TransactionSignaturePayload {
        network_id: network::network_id(network_passphrase),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    Ok(Sha256::digest(signature_payload.to_xdr(Limits::none())?).into())
}

pub fn sign(
    tx: Transaction,
    key: &SigningKey,
    network_passphrase: &str,
) -> Result<TransactionEnvelope, Error> {
    let tx_hash = transaction_hash(&tx, network_passphrase)?;
    let tx_signature = key.sign(&tx_hash);

    let public = key.verifying_key().to_bytes();
    let decorated_signature = DecoratedSignature {
        hint: SignatureHint([public[28], public[29], public[30], public[31]]),
        signature: Signature(tx_signature.to_bytes().to_vec().try_into()?),
    };

    Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: vec![decorated_signature].try_into()?,
    }))
}

/// Where a submitted transaction is on its way to a terminal status.
#[derive(Debug, Clone)]
pub enum Finality {
    Submitted { hash: String },
    Pending { hash: String, polls: u32 },
    Success(GetTransactionResponse),
    Failed(GetTransactionResponse),
    TimedOut { hash: String, elapsed: Duration },
}

impl Finality {
    pub fn submitted(hash: impl Into<String>) -> Self {
        Finality::Submitted { hash: hash.into() }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Finality::Success(_) | Finality::Failed(_) | Finality::TimedOut { .. }
        )
    }

    /// Applies one poll result. A pending observation made at or past the
    /// deadline ends in `TimedOut`; terminal states never change.
    pub fn advance(
        self,
        response: GetTransactionResponse,
        elapsed: Duration,
        deadline: Duration,
    ) -> Result<Self, rpc::Error> {
        let (hash, polls) = match self {
            Finality::Submitted { hash } => (hash, 0),
            Finality::Pending { hash, polls } => (hash, polls),
            terminal => return Ok(terminal),
        };
        Ok(match response.status()? {
            TransactionStatus::Success => Finality::Success(response),
            TransactionStatus::Failed => Finality::Failed(response),
            TransactionStatus::Pending if elapsed >= deadline => {
                Finality::TimedOut { hash, elapsed }
            }
            TransactionStatus::Pending => Finality::Pending {
                hash,
                polls: polls + 1,
            },
        })
    }
}

/// Submits signed transactions and waits for them to reach a terminal status.
pub struct Submitter<'a> {
    client: &'a rpc::Client,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a> Submitter<'a> {
    pub fn new(client: &'a rpc::Client) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Submits `tx` exactly once and polls until it succeeds, fails or the
    /// deadline passes.
    pub async fn submit(&self, tx: &TransactionEnvelope) -> Result<GetTransactionResponse, Error> {
        let response = self.client.send_transaction(tx).await?;
        match response.status.as_str() {
            "PENDING" | "DUPLICATE" => (),
            _ => {
                let reason = response.error_detail();
                tracing::error!(hash = %response.hash, status = %response.status, %reason);
                return Err(Error::Rejected {
                    hash: response.hash,
                    status: response.status,
                    reason,
                });
            }
        }
        tracing::debug!(hash = %response.hash, "transaction submitted");

        let hash = response.hash;
        let start = Instant::now();
        let mut finality = Finality::submitted(hash.clone());
        loop {
            let response = self.client.get_transaction(&hash).await?;
            finality = finality.advance(response, start.elapsed(), self.timeout)?;
            tracing::debug!(?finality);
            match &finality {
                Finality::Success(response) => return Ok(response.clone()),
                Finality::Failed(response) => {
                    tracing::error!(?response);
                    return Err(Error::Failed {
                        hash,
                        ledger: response.ledger,
                        reason: response.result_detail(),
                    });
                }
                Finality::TimedOut { elapsed, .. } => {
                    return Err(Error::Timeout {
                        hash,
                        url: self.client.base_url().to_string(),
                        elapsed: *elapsed,
                    });
                }
                Finality::Submitted { .. } | Finality::Pending { .. } => {
                    sleep(self.poll_interval).await;
                }
            }
        }
    }
}
