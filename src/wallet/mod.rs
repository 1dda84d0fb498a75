pub mod devchain;
pub mod traits;

pub use devchain::DevChainWallet;
pub use traits::{Address, TxReceipt, WalletTrait};
