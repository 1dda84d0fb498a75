use chrono::Utc;
use tracing::{debug, info};

use crate::error::{ImmoError, Result};
use crate::models::{Listing, PurchaseRecord};
use crate::storage::PurchaseStore;
use crate::wallet::{Address, WalletTrait};

/// Buy a listing: pay the treasury in tokens, persist a receipt, and take
/// the listing off the market.
///
/// Sequencing follows the wallet flow: balance check, allowance check and
/// raise, transfer, then the local record. A failed transfer leaves the
/// ledger and the catalog untouched; the in-memory flag only flips after the
/// receipt is persisted, so a reload reconciles to the same state.
pub async fn purchase_listing(
    wallet: &dyn WalletTrait,
    store: &PurchaseStore,
    listings: &mut [Listing],
    listing_id: &str,
    buyer: &Address,
    treasury: &Address,
) -> Result<PurchaseRecord> {
    let listing = listings
        .iter()
        .find(|l| l.id == listing_id && l.is_for_sale)
        .cloned()
        .ok_or_else(|| ImmoError::ListingUnavailable(listing_id.to_string()))?;

    let symbol = wallet.symbol().await?;
    let price = listing.price;

    let balance = wallet.balance_of(buyer).await?;
    if balance < price {
        return Err(ImmoError::InsufficientBalance {
            have: balance,
            need: price,
        });
    }

    let allowance = wallet.allowance(buyer, treasury).await?;
    if allowance < price {
        wallet.approve(treasury, price).await?;
        debug!("allowance raised to {} {} for {}", price, symbol, treasury);
    }

    let receipt = wallet.transfer(treasury, price).await?;
    info!("transfer settled: {}", receipt.tx_hash);

    // Local receipt only: nothing on chain ties the token transfer to
    // ownership of the listing.
    let record = PurchaseRecord::from_listing(&listing, format!("{price} {symbol}"), Utc::now());
    store.append(record.clone()).await?;

    if let Some(listing) = listings.iter_mut().find(|l| l.id == listing_id) {
        listing.is_for_sale = false;
    }

    Ok(record)
}
