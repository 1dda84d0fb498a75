use async_trait::async_trait;

use crate::error::Result;
use crate::tokens::TokenAmount;

/// On-chain account address
pub type Address = String;

/// Settled result of a submitted transaction
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub tx_hash: String,
}

/// Common trait for wallet/token providers.
/// The marketplace treats these as opaque asynchronous calls; a real chain
/// client would implement the same seam.
#[async_trait]
pub trait WalletTrait: Send + Sync {
    /// Prompt the wallet to connect and return the available accounts
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Accounts already connected, empty while the wallet is disconnected
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Token symbol
    async fn symbol(&self) -> Result<String>;

    /// Token balance of an account
    async fn balance_of(&self, account: &Address) -> Result<TokenAmount>;

    /// Mint new tokens to an account (authorized accounts only)
    async fn mint(&self, to: &Address, amount: TokenAmount) -> Result<TxReceipt>;

    /// Remaining allowance granted by `owner` to `spender`
    async fn allowance(&self, owner: &Address, spender: &Address) -> Result<TokenAmount>;

    /// Approve `spender` to spend `amount` on behalf of the connected account
    async fn approve(&self, spender: &Address, amount: TokenAmount) -> Result<TxReceipt>;

    /// Transfer tokens from the connected account
    async fn transfer(&self, to: &Address, amount: TokenAmount) -> Result<TxReceipt>;

    /// Get the name of the provider
    fn provider_name(&self) -> &'static str;
}
