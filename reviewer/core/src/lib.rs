// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Reviewer Core
//!
//! Transactional consistency core of the pull-request reviewer assignment
//! service: team reconciliation, reviewer assignment and reassignment, and
//! the idempotent merge transition.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain policy, use-case services and storage executors

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
