mod catalog;
mod error;
mod marketplace;
mod models;
mod purchase;
mod storage;
mod tokens;
mod wallet;

use marketplace::{filter_listings, FilterCriteria};
use storage::PurchaseStore;
use tokens::TokenAmount;
use tracing::{info, warn, Level};
use tracing_subscriber;
use wallet::{DevChainWallet, WalletTrait};

const CATALOG_PATH: &str = "data/properties.json";
const LEDGER_PATH: &str = "data/purchased_properties.json";
const TOKEN_SYMBOL: &str = "IMMO";
/// Marketplace treasury, the account that receives purchase payments
const TREASURY: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const STARTING_TOKENS: &str = "100";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏠 ImmoChain Marketplace");
    info!("========================");

    let (criteria, buy_id) = parse_args(std::env::args().skip(1))?;

    // Connect the dev wallet and fund the demo account
    let chain = DevChainWallet::new(TOKEN_SYMBOL);
    let accounts = chain.request_accounts().await?;
    let buyer = accounts[0].clone();
    let symbol = chain.symbol().await?;
    info!("Connected to {} as {}", chain.provider_name(), buyer);

    chain.mint(&buyer, TokenAmount::parse(STARTING_TOKENS)?).await?;
    info!("Minted {} {} to {}", STARTING_TOKENS, symbol, buyer);

    // Load the catalog and overlay recorded purchases
    let store = PurchaseStore::new(LEDGER_PATH);
    let mut listings = catalog::load_marketplace(CATALOG_PATH, &store).await?;
    info!("Loaded {} listings", listings.len());

    if !criteria.is_empty() {
        info!("Applying filters: {:?}", criteria);
    }

    let matching = filter_listings(&listings, &criteria);
    println!();
    for (i, listing) in matching.iter().enumerate() {
        let status = if listing.is_for_sale { "À vendre" } else { "Vendu" };
        println!(
            "{}. {} ({} {}) [{}]",
            i + 1,
            listing.title,
            listing.price,
            symbol,
            status
        );
        println!("   {} · {} m²", listing.location, listing.size);
        println!("   {}", listing.description);
        println!("   ID: {}", listing.id);
        println!();
    }
    info!("{} of {} listings match", matching.len(), listings.len());

    // Buy the requested listing, or the first matching one still for sale
    let target = buy_id.or_else(|| {
        matching
            .iter()
            .find(|l| l.is_for_sale)
            .map(|l| l.id.clone())
    });

    let Some(listing_id) = target else {
        info!("Nothing left to buy");
        return Ok(());
    };

    let treasury = TREASURY.to_string();
    match purchase::purchase_listing(&chain, &store, &mut listings, &listing_id, &buyer, &treasury)
        .await
    {
        Ok(record) => {
            info!("✅ Purchased {} for {}", record.title, record.purchase_price)
        }
        Err(e) => warn!("Purchase failed: {e}"),
    }

    let balance = chain.balance_of(&buyer).await?;
    info!("Remaining balance: {} {}", balance, symbol);

    // My-properties view, straight from the ledger
    let owned = store.load().await;
    info!("💾 {} purchase(s) recorded in {}", owned.len(), store.path().display());
    for record in &owned {
        println!(
            "- {} ({}, {} m²) acheté le {} pour {}",
            record.title,
            record.location,
            record.size,
            record.purchase_date.format("%Y-%m-%d"),
            record.purchase_price
        );
    }

    Ok(())
}

/// Minimal flag parsing: five filter fields plus the listing to buy
fn parse_args<I: Iterator<Item = String>>(
    mut args: I,
) -> anyhow::Result<(FilterCriteria, Option<String>)> {
    let mut criteria = FilterCriteria::default();
    let mut buy = None;

    while let Some(flag) = args.next() {
        let value = args
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
        match flag.as_str() {
            "--location" => criteria.location = Some(value),
            "--min-price" => criteria.min_price = Some(value),
            "--max-price" => criteria.max_price = Some(value),
            "--min-size" => criteria.min_size = Some(value),
            "--max-size" => criteria.max_size = Some(value),
            "--buy" => buy = Some(value),
            other => anyhow::bail!("unknown option {other}"),
        }
    }

    Ok((criteria, buy))
}
