// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SDAC Elia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Error types for the core crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdacError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to Elia failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Elia returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed price payload: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SdacError>;
