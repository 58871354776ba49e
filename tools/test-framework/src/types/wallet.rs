/*!
   Types for information about a chain wallet.
*/

use core::fmt::{self, Display};

use crate::types::env::{prefix_writer, EnvWriter, ExportEnv};

/**
   Newtype wrapper for a wallet ID as identified by the chain and relayer.
*/
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WalletId(pub String);

/**
   Newtype wrapper for the address a wallet corresponds to.
*/
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WalletAddress(pub String);

/**
   A wallet created in the keyring of a chain, with the mnemonic that
   the relayer imports its key from.
*/
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The ID of the wallet for accessing it from the key store.
    pub id: WalletId,

    /// The address for receiving tokens for this wallet.
    pub address: WalletAddress,

    /// The mnemonic the key was derived from.
    pub mnemonic: String,
}

/**
   The wallets that are created on each chain during bootstrap.
*/
#[derive(Debug, Clone)]
pub struct TestWallets {
    /// The validator wallet, staked in the genesis.
    pub validator: Wallet,

    /// The wallet used by the relayer to submit IBC messages.
    pub relayer: Wallet,

    /// The wallet used to deploy and call the contract.
    pub user: Wallet,
}

impl Wallet {
    /// Create a new [`Wallet`]
    pub fn new(id: String, address: String, mnemonic: String) -> Self {
        Self {
            id: WalletId(id),
            address: WalletAddress(address),
            mnemonic,
        }
    }
}

impl Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ExportEnv for Wallet {
    fn export_env(&self, writer: &mut impl EnvWriter) {
        writer.write_env("KEY_ID", &self.id.0);
        writer.write_env("ADDRESS", &self.address.0);
    }
}

impl ExportEnv for TestWallets {
    fn export_env(&self, writer: &mut impl EnvWriter) {
        self.validator
            .export_env(&mut prefix_writer("VALIDATOR", writer));
        self.relayer.export_env(&mut prefix_writer("RELAYER", writer));
        self.user.export_env(&mut prefix_writer("USER", writer));
    }
}
