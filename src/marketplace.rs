use serde::{Deserialize, Serialize};

use crate::models::Listing;
use crate::tokens::TokenAmount;

/// User-supplied search criteria for the marketplace.
///
/// Every field is free text and optional. Numeric fields that do not parse
/// are treated as absent rather than rejected, so the predicate is total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive location substring
    pub location: Option<String>,
    /// Minimum price in whole tokens
    pub min_price: Option<String>,
    /// Maximum price in whole tokens
    pub max_price: Option<String>,
    /// Minimum floor size in square meters
    pub min_size: Option<String>,
    /// Maximum floor size in square meters
    pub max_size: Option<String>,
}

impl FilterCriteria {
    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        [
            &self.location,
            &self.min_price,
            &self.max_price,
            &self.min_size,
            &self.max_size,
        ]
        .iter()
        .all(|field| normalized(field).is_none())
    }

    /// True iff the listing satisfies every present criterion.
    ///
    /// Bounds are independent conjuncts, so an inverted range (min > max)
    /// matches nothing.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(location) = normalized(&self.location) {
            if !listing
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }

        if let Some(min) = price_bound(&self.min_price) {
            if listing.price < min {
                return false;
            }
        }
        if let Some(max) = price_bound(&self.max_price) {
            if listing.price > max {
                return false;
            }
        }

        if let Some(min) = size_bound(&self.min_size) {
            if listing.size < min {
                return false;
            }
        }
        if let Some(max) = size_bound(&self.max_size) {
            if listing.size > max {
                return false;
            }
        }

        true
    }
}

/// Listings that pass the criteria, in catalog order.
pub fn filter_listings<'a>(listings: &'a [Listing], criteria: &FilterCriteria) -> Vec<&'a Listing> {
    listings.iter().filter(|l| criteria.matches(l)).collect()
}

fn normalized(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// Price bounds are compared in base units, so the comparison is exact.
fn price_bound(field: &Option<String>) -> Option<TokenAmount> {
    normalized(field).and_then(|s| TokenAmount::parse(s).ok())
}

fn size_bound(field: &Option<String>) -> Option<f64> {
    normalized(field)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, price: &str, size: f64, location: &str) -> Listing {
        Listing {
            id: id.to_string(),
            title: format!("Listing {id}"),
            description: String::new(),
            image_url: String::new(),
            price: TokenAmount::parse(price).unwrap(),
            size,
            location: location.to_string(),
            is_for_sale: true,
        }
    }

    fn criteria(
        location: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
        min_size: Option<&str>,
        max_size: Option<&str>,
    ) -> FilterCriteria {
        FilterCriteria {
            location: location.map(str::to_string),
            min_price: min_price.map(str::to_string),
            max_price: max_price.map(str::to_string),
            min_size: min_size.map(str::to_string),
            max_size: max_size.map(str::to_string),
        }
    }

    #[test]
    fn empty_criteria_match_everything() {
        let l = listing("1", "10", 250.0, "Cannes");
        assert!(FilterCriteria::default().is_empty());
        assert!(FilterCriteria::default().matches(&l));
    }

    #[test]
    fn price_range_is_inclusive() {
        let l = listing("1", "10", 250.0, "Cannes");
        assert!(criteria(None, Some("5"), Some("20"), None, None).matches(&l));
        assert!(criteria(None, Some("10"), Some("10"), None, None).matches(&l));
        assert!(!criteria(None, Some("11"), None, None, None).matches(&l));
        assert!(!criteria(None, None, Some("9.99"), None, None).matches(&l));
    }

    #[test]
    fn location_is_a_case_insensitive_substring() {
        let l = listing("1", "10", 250.0, "Cannes");
        assert!(criteria(Some("cannes"), None, None, None, None).matches(&l));
        assert!(criteria(Some("ann"), None, None, None, None).matches(&l));
        assert!(!criteria(Some("Paris"), None, None, None, None).matches(&l));
    }

    #[test]
    fn size_bounds_apply() {
        let l = listing("1", "10", 250.0, "Cannes");
        assert!(criteria(None, None, None, Some("200"), Some("300")).matches(&l));
        assert!(!criteria(None, None, None, Some("251"), None).matches(&l));
        assert!(!criteria(None, None, None, None, Some("249")).matches(&l));
    }

    #[test]
    fn unparsable_bounds_are_treated_as_absent() {
        let l = listing("1", "10", 250.0, "Cannes");
        assert!(criteria(None, Some("cheap"), None, None, None).matches(&l));
        assert!(criteria(None, None, None, Some(""), Some("  ")).matches(&l));
        assert!(criteria(None, None, None, Some("NaN"), None).matches(&l));
    }

    #[test]
    fn adding_a_criterion_never_grows_the_match() {
        let listings = vec![
            listing("1", "10", 250.0, "Cannes"),
            listing("2", "30", 80.0, "Paris 8e"),
            listing("3", "4.2", 28.0, "Nice"),
        ];

        let loose = criteria(None, Some("4"), None, None, None);
        let tight = criteria(Some("nice"), Some("4"), None, None, None);

        let loose_ids: Vec<&str> = filter_listings(&listings, &loose)
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        let tight_ids: Vec<&str> = filter_listings(&listings, &tight)
            .iter()
            .map(|l| l.id.as_str())
            .collect();

        assert!(tight_ids.iter().all(|id| loose_ids.contains(id)));
        assert_eq!(tight_ids, vec!["3"]);
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let listings = vec![
            listing("1", "10", 250.0, "Cannes"),
            listing("2", "15", 80.0, "Paris 8e"),
        ];
        let inverted = criteria(None, Some("20"), Some("5"), None, None);
        assert!(filter_listings(&listings, &inverted).is_empty());
    }
}
