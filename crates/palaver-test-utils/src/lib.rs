// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Palaver integration tests.
//!
//! Provides a scripted completion backend and a harness that wires it into a
//! real session controller, so lifecycle tests run without a network.
//!
//! # Components
//!
//! - [`MockBackend`] - Scripted replies and failures, call recording, and an
//!   optional gate that holds replies until released
//! - [`TestHarness`] - Controller plus mock backend built from config

pub mod harness;
pub mod mock_backend;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_backend::{MockBackend, MockReply};
