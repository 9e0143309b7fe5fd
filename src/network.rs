use ed25519_dalek::SigningKey;
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{AccountId, Hash, MuxedAccount, PublicKey, Uint256};

pub const STANDALONE_NETWORK_PASSPHRASE: &str = "Standalone Network ; February 2017";

/// Lowest per-operation fee, in stroops, a network accepts.
pub const MIN_BASE_FEE: u32 = 100;

/// 10,000,000 stroops in 1 XLM
pub const ONE_XLM: i64 = 10_000_000;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid account address {address}: {error}")]
    InvalidAddress {
        address: String,
        error: stellar_strkey::DecodeError,
    },
}

/// Network id that scopes signatures to a single chain instance.
pub fn network_id(network_passphrase: &str) -> Hash {
    Hash(Sha256::digest(network_passphrase.as_bytes()).into())
}

/// The root account key of a network is seeded by the hash of its passphrase,
/// so every standalone network with the same passphrase shares it.
pub fn root_key(network_passphrase: &str) -> SigningKey {
    SigningKey::from_bytes(&network_id(network_passphrase).0)
}

pub fn address(key: &SigningKey) -> stellar_strkey::ed25519::PublicKey {
    stellar_strkey::ed25519::PublicKey(key.verifying_key().to_bytes())
}

pub fn account_id(address: &str) -> Result<AccountId, Error> {
    let key = stellar_strkey::ed25519::PublicKey::from_string(address).map_err(|error| {
        Error::InvalidAddress {
            address: address.to_string(),
            error,
        }
    })?;
    Ok(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key.0))))
}

pub fn muxed_account(address: &str) -> Result<MuxedAccount, Error> {
    let AccountId(PublicKey::PublicKeyTypeEd25519(key)) = account_id(address)?;
    Ok(MuxedAccount::Ed25519(key))
}
