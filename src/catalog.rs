use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::error::ImmoError;
use crate::models::{Listing, RawListing};
use crate::storage::PurchaseStore;
use crate::tokens::TokenAmount;

/// Validate one raw catalog record.
pub fn parse_listing(raw: RawListing) -> std::result::Result<Listing, ImmoError> {
    let price = TokenAmount::parse(&raw.price)?;
    let size = raw
        .size
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .ok_or_else(|| ImmoError::Conversion {
            value: raw.size.clone(),
            reason: "floor size must be a non-negative number".to_string(),
        })?;

    Ok(Listing {
        id: raw.id,
        title: raw.title,
        description: raw.description,
        image_url: raw.image_url,
        price,
        size,
        location: raw.location,
        is_for_sale: raw.is_for_sale,
    })
}

/// Validate a whole catalog. Malformed records are dropped with a warning,
/// the rest load.
pub fn parse_catalog(raw: Vec<RawListing>) -> Vec<Listing> {
    let mut listings = Vec::with_capacity(raw.len());
    for record in raw {
        let id = record.id.clone();
        match parse_listing(record) {
            Ok(listing) => listings.push(listing),
            Err(e) => warn!("dropping catalog record {id}: {e}"),
        }
    }
    listings
}

/// Load the catalog from disk, falling back to the built-in listings when
/// the file does not exist.
pub async fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Listing>> {
    let path = path.as_ref();
    let raw: Vec<RawListing> = match tokio::fs::read_to_string(path).await {
        Ok(json) => serde_json::from_str(&json)
            .with_context(|| format!("catalog file {} is not valid JSON", path.display()))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "catalog file {} not found, using built-in listings",
                path.display()
            );
            seed_catalog()
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read catalog file {}", path.display()));
        }
    };

    Ok(parse_catalog(raw))
}

/// Force for-sale off for every listing that is already purchased.
///
/// Pure and idempotent: reconciling twice with the same purchase set yields
/// the same catalog.
pub fn reconcile(listings: Vec<Listing>, purchased: &HashSet<String>) -> Vec<Listing> {
    listings
        .into_iter()
        .map(|listing| {
            if purchased.contains(&listing.id) {
                Listing {
                    is_for_sale: false,
                    ..listing
                }
            } else {
                listing
            }
        })
        .collect()
}

/// Load the catalog and overlay the persisted purchase state.
///
/// Storage problems degrade to an empty purchase set and never fail the
/// load.
pub async fn load_marketplace(
    path: impl AsRef<Path>,
    store: &PurchaseStore,
) -> Result<Vec<Listing>> {
    let listings = load_catalog(path).await?;
    let purchased = store.purchased_ids().await;
    Ok(reconcile(listings, &purchased))
}

/// Built-in catalog used when no catalog file is present
fn seed_catalog() -> Vec<RawListing> {
    vec![
        RawListing {
            id: "prop-001".to_string(),
            title: "Villa Azur".to_string(),
            description: "Villa contemporaine avec piscine à débordement et vue sur la baie."
                .to_string(),
            image_url: "/images/villa-azur.jpg".to_string(),
            price: "25".to_string(),
            size: "250".to_string(),
            location: "Cannes".to_string(),
            is_for_sale: true,
        },
        RawListing {
            id: "prop-002".to_string(),
            title: "Appartement Haussmannien".to_string(),
            description: "Troisième étage d'un immeuble haussmannien, moulures et parquet d'origine."
                .to_string(),
            image_url: "/images/haussmann.jpg".to_string(),
            price: "18.5".to_string(),
            size: "120".to_string(),
            location: "Paris 8e".to_string(),
            is_for_sale: true,
        },
        RawListing {
            id: "prop-003".to_string(),
            title: "Chalet des Aiguilles".to_string(),
            description: "Chalet en mélèze face au massif du Mont-Blanc, ski aux pieds.".to_string(),
            image_url: "/images/chalet.jpg".to_string(),
            price: "12".to_string(),
            size: "140".to_string(),
            location: "Chamonix".to_string(),
            is_for_sale: true,
        },
        RawListing {
            id: "prop-004".to_string(),
            title: "Loft des Docks".to_string(),
            description: "Ancien entrepôt réhabilité en loft, verrière d'atelier et poutres métalliques."
                .to_string(),
            image_url: "/images/loft.jpg".to_string(),
            price: "8.75".to_string(),
            size: "95".to_string(),
            location: "Lyon Confluence".to_string(),
            is_for_sale: true,
        },
        RawListing {
            id: "prop-005".to_string(),
            title: "Mas des Oliviers".to_string(),
            description: "Mas provençal restauré au milieu des oliviers, cour ombragée.".to_string(),
            image_url: "/images/mas.jpg".to_string(),
            price: "15".to_string(),
            size: "180".to_string(),
            location: "Aix-en-Provence".to_string(),
            is_for_sale: true,
        },
        RawListing {
            id: "prop-006".to_string(),
            title: "Studio Promenade".to_string(),
            description: "Studio rénové à deux pas de la Promenade des Anglais.".to_string(),
            image_url: "/images/studio.jpg".to_string(),
            price: "4.2".to_string(),
            size: "28".to_string(),
            location: "Nice".to_string(),
            is_for_sale: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, price: &str, size: &str) -> RawListing {
        RawListing {
            id: id.to_string(),
            title: format!("Listing {id}"),
            description: String::new(),
            image_url: String::new(),
            price: price.to_string(),
            size: size.to_string(),
            location: "Cannes".to_string(),
            is_for_sale: true,
        }
    }

    #[test]
    fn parse_listing_converts_price_to_base_units() {
        let listing = parse_listing(raw("1", "10", "250")).unwrap();
        assert_eq!(listing.price, TokenAmount::parse("10").unwrap());
        assert_eq!(listing.size, 250.0);
        assert!(listing.is_for_sale);
    }

    #[test]
    fn malformed_price_is_quarantined() {
        let listings = parse_catalog(vec![raw("1", "not-a-price", "100"), raw("2", "5", "80")]);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "2");
    }

    #[test]
    fn malformed_size_is_quarantined() {
        let listings = parse_catalog(vec![raw("1", "5", "large"), raw("2", "5", "-10")]);
        assert!(listings.is_empty());
    }

    #[test]
    fn reconcile_marks_purchased_listings_sold() {
        let purchased: HashSet<String> = ["1".to_string()].into_iter().collect();
        let listings = parse_catalog(vec![raw("1", "10", "250"), raw("2", "5", "80")]);

        let reconciled = reconcile(listings, &purchased);
        assert!(!reconciled[0].is_for_sale);
        assert!(reconciled[1].is_for_sale);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let purchased: HashSet<String> = ["1".to_string()].into_iter().collect();
        let listings = parse_catalog(vec![raw("1", "10", "250"), raw("2", "5", "80")]);

        let once = reconcile(listings, &purchased);
        let twice = reconcile(once.clone(), &purchased);
        let flags_once: Vec<bool> = once.iter().map(|l| l.is_for_sale).collect();
        let flags_twice: Vec<bool> = twice.iter().map(|l| l.is_for_sale).collect();
        assert_eq!(flags_once, flags_twice);
    }

    #[test]
    fn reconcile_with_no_purchases_changes_nothing() {
        let listings = parse_catalog(vec![raw("1", "10", "250")]);
        let reconciled = reconcile(listings, &HashSet::new());
        assert!(reconciled[0].is_for_sale);
    }

    #[tokio::test]
    async fn malformed_ledger_does_not_fail_the_load() {
        let slot = std::env::temp_dir().join(format!(
            "immochain-bad-ledger-{}.json",
            std::process::id()
        ));
        tokio::fs::write(&slot, "not-json").await.unwrap();
        let store = PurchaseStore::new(&slot);

        // catalog path does not exist, so the built-in listings load; the
        // broken ledger must degrade to "nothing purchased"
        let missing = std::env::temp_dir().join("immochain-no-such-catalog.json");
        let listings = load_marketplace(&missing, &store).await.unwrap();
        assert!(!listings.is_empty());
        assert!(listings.iter().all(|l| l.is_for_sale));

        let _ = tokio::fs::remove_file(&slot).await;
    }
}
