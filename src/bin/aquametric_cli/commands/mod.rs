// ABOUTME: Re-exports command modules for aquametric-cli
// ABOUTME: Provides the analysis and inspection command handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

pub mod analyze;
pub mod inspect;
