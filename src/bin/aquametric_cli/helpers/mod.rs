// ABOUTME: Helper modules for aquametric-cli
// ABOUTME: Terminal output formatting shared by the command handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric

pub mod display;
