// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits implemented by plugin runners.
//!
//! Runners are created per invocation by a [`RunnerFactory`] and driven by
//! the execution engine through the [`ActionRunner`] lifecycle.

pub mod runner;

pub use runner::{ActionRunner, FnFactory, RunnerFactory};
