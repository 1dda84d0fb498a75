use thiserror::Error;

use crate::tokens::TokenAmount;

/// Error surface of the marketplace core.
///
/// None of these are fatal to the application: conversion and storage
/// problems are recovered with defaults where the caller asks for it, the
/// wallet errors are surfaced to the user and the purchase is simply not
/// recorded.
#[derive(Debug, Error)]
pub enum ImmoError {
    #[error("conversion error for {value:?}: {reason}")]
    Conversion { value: String, reason: String },

    #[error("purchase storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("purchase storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: TokenAmount, need: TokenAmount },

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("no wallet account connected")]
    WalletNotConnected,

    #[error("listing {0:?} is not available for sale")]
    ListingUnavailable(String),
}

pub type Result<T> = std::result::Result<T, ImmoError>;
