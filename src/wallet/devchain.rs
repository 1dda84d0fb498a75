use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ImmoError, Result};
use crate::tokens::TokenAmount;
use crate::wallet::traits::{Address, TxReceipt, WalletTrait};

/// In-memory development chain standing in for a real wallet provider.
///
/// The first account is the token authority and the only one allowed to
/// mint. Ledger state lives behind an RwLock so the wallet can be shared
/// across tasks.
pub struct DevChainWallet {
    symbol: String,
    authority: Address,
    accounts: Vec<Address>,
    state: RwLock<ChainState>,
}

#[derive(Default)]
struct ChainState {
    connected: Option<Address>,
    balances: HashMap<Address, TokenAmount>,
    allowances: HashMap<(Address, Address), TokenAmount>,
    next_tx: u64,
}

impl ChainState {
    fn receipt(&mut self) -> TxReceipt {
        self.next_tx += 1;
        TxReceipt {
            tx_hash: format!("0x{:064x}", self.next_tx),
        }
    }

    fn credit(&mut self, account: &Address, amount: TokenAmount) -> Result<()> {
        let balance = self.balances.entry(account.clone()).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| ImmoError::TransactionFailed("balance overflow".to_string()))?;
        Ok(())
    }
}

impl DevChainWallet {
    /// Dev chain with a single default account
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_accounts(
            symbol,
            vec!["0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string()],
        )
    }

    /// Dev chain with explicit accounts; the first one is the mint authority.
    pub fn with_accounts(symbol: impl Into<String>, accounts: Vec<Address>) -> Self {
        assert!(!accounts.is_empty(), "dev chain needs at least one account");
        DevChainWallet {
            symbol: symbol.into(),
            authority: accounts[0].clone(),
            accounts,
            state: RwLock::new(ChainState::default()),
        }
    }

    /// Switch the connected account (the `accountsChanged` event of a real
    /// wallet).
    pub async fn switch_account(&self, account: &Address) -> Result<()> {
        if !self.accounts.contains(account) {
            return Err(ImmoError::TransactionFailed(format!(
                "unknown account {account}"
            )));
        }
        self.state.write().await.connected = Some(account.clone());
        Ok(())
    }

    async fn connected(&self) -> Result<Address> {
        self.state
            .read()
            .await
            .connected
            .clone()
            .ok_or(ImmoError::WalletNotConnected)
    }
}

#[async_trait]
impl WalletTrait for DevChainWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let mut state = self.state.write().await;
        if state.connected.is_none() {
            state.connected = Some(self.accounts[0].clone());
            info!("wallet connected as {}", self.accounts[0]);
        }
        Ok(self.accounts.clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.state.read().await.connected.clone().into_iter().collect())
    }

    async fn symbol(&self) -> Result<String> {
        Ok(self.symbol.clone())
    }

    async fn balance_of(&self, account: &Address) -> Result<TokenAmount> {
        Ok(self
            .state
            .read()
            .await
            .balances
            .get(account)
            .copied()
            .unwrap_or_default())
    }

    async fn mint(&self, to: &Address, amount: TokenAmount) -> Result<TxReceipt> {
        let caller = self.connected().await?;
        if caller != self.authority {
            return Err(ImmoError::TransactionFailed(format!(
                "mint: {caller} is not authorized"
            )));
        }
        let mut state = self.state.write().await;
        state.credit(to, amount)?;
        debug!("minted {} {} to {}", amount, self.symbol, to);
        Ok(state.receipt())
    }

    async fn allowance(&self, owner: &Address, spender: &Address) -> Result<TokenAmount> {
        Ok(self
            .state
            .read()
            .await
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default())
    }

    async fn approve(&self, spender: &Address, amount: TokenAmount) -> Result<TxReceipt> {
        let owner = self.connected().await?;
        let mut state = self.state.write().await;
        state.allowances.insert((owner.clone(), spender.clone()), amount);
        debug!("{} approved {} for {}", owner, amount, spender);
        Ok(state.receipt())
    }

    async fn transfer(&self, to: &Address, amount: TokenAmount) -> Result<TxReceipt> {
        let from = self.connected().await?;
        let mut state = self.state.write().await;
        let have = state.balances.get(&from).copied().unwrap_or_default();
        let remaining = have
            .checked_sub(amount)
            .ok_or(ImmoError::InsufficientBalance { have, need: amount })?;
        state.balances.insert(from.clone(), remaining);
        state.credit(to, amount)?;
        debug!("transferred {} {} from {} to {}", amount, self.symbol, from, to);
        Ok(state.receipt())
    }

    fn provider_name(&self) -> &'static str {
        "DevChain"
    }
}
