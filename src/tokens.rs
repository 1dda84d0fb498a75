use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ImmoError;

/// Fractional digits carried by token amounts
pub const TOKEN_DECIMALS: u32 = 18;

/// Base units per whole token
const BASE: u128 = 10u128.pow(TOKEN_DECIMALS);

/// A token amount in base units, scaled by 10^18.
///
/// Catalog prices arrive as decimal strings ("12.5"); balances and transfers
/// work in base units. Parsing and formatting round-trip exactly within the
/// 18 fractional digits the token carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    pub fn from_base_units(units: u128) -> Self {
        TokenAmount(units)
    }

    pub fn base_units(self) -> u128 {
        self.0
    }

    /// Parse a non-negative decimal string into base units.
    ///
    /// Rejects malformed input, negative values, more than 18 fractional
    /// digits, and values whose base-unit form does not fit.
    pub fn parse(input: &str) -> Result<Self, ImmoError> {
        let conversion = |reason: &str| ImmoError::Conversion {
            value: input.to_string(),
            reason: reason.to_string(),
        };

        let decimal = Decimal::from_str(input.trim())
            .map_err(|e| conversion(&e.to_string()))?;

        if decimal < Decimal::ZERO {
            return Err(conversion("amount must not be negative"));
        }
        if decimal.scale() > TOKEN_DECIMALS {
            return Err(conversion("more than 18 fractional digits"));
        }

        // mantissa is non-negative here; widening it by the missing scale
        // gives the exact base-unit value
        let mantissa = u128::try_from(decimal.mantissa())
            .map_err(|_| conversion("amount must not be negative"))?;
        let units = mantissa
            .checked_mul(10u128.pow(TOKEN_DECIMALS - decimal.scale()))
            .ok_or_else(|| conversion("amount out of range"))?;

        Ok(TokenAmount(units))
    }

    pub fn checked_add(self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(other.0).map(TokenAmount)
    }

    pub fn checked_sub(self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(other.0).map(TokenAmount)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / BASE;
        let frac = self.0 % BASE;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let digits = format!("{frac:018}");
            write!(f, "{whole}.{}", digits.trim_end_matches('0'))
        }
    }
}

impl FromStr for TokenAmount {
    type Err = ImmoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenAmount::parse(s)
    }
}
