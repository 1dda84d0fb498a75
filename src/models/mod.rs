use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tokens::TokenAmount;

/// Catalog record as it appears on disk, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Price in whole tokens, as a decimal string
    pub price: String,
    /// Floor size in square meters, as a numeric string
    pub size: String,
    pub location: String,
    pub is_for_sale: bool,
}

/// Validated property listing
#[derive(Debug, Clone)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: TokenAmount,
    pub size: f64,
    pub location: String,
    pub is_for_sale: bool,
}

/// Locally persisted receipt of a simulated purchase.
///
/// Carries a full copy of the listing at purchase time so owned properties
/// render without the catalog. This is display state only: nothing on chain
/// ties the token transfer to ownership of the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub size: f64,
    pub location: String,
    pub purchase_date: DateTime<Utc>,
    /// Formatted price at purchase time, e.g. "12.5 IMMO"
    pub purchase_price: String,
}

impl PurchaseRecord {
    /// Build a receipt from the listing being purchased
    pub fn from_listing(
        listing: &Listing,
        purchase_price: String,
        purchase_date: DateTime<Utc>,
    ) -> Self {
        PurchaseRecord {
            id: listing.id.clone(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            image_url: listing.image_url.clone(),
            size: listing.size,
            location: listing.location.clone(),
            purchase_date,
            purchase_price,
        }
    }
}
