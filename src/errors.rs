// ABOUTME: Error handling for the AquaMetric application layer
// ABOUTME: Re-exports the core error taxonomy so callers need a single import path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

//! Unified error handling
//!
//! All fallible operations in this crate return [`AppResult`]. The error type
//! itself lives in `aquametric-core` so the analysis engine and the
//! application layer agree on codes.

pub use aquametric_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
