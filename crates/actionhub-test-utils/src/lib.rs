// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ActionHub integration tests.
//!
//! - [`RecordingRunner`] records every lifecycle call it receives
//! - [`CountingFactory`] counts instantiations and hands out recording runners
//! - [`TestHarness`] assembles a registry, catalog, and engine around them

pub mod harness;
pub mod recording;

pub use harness::{TestHarness, TestHarnessBuilder, TEST_PLUGIN_ID, TEST_SERVICE_ID};
pub use recording::{Behavior, CallLog, CountingFactory, RecordingRunner, RunnerCall};
