// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Entities, pure decision policy, error taxonomy and repository contracts.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Storage-agnostic model of teams, members and pull requests

pub mod member;
pub mod team;
pub mod pull_request;
pub mod statistics;
pub mod assignment;
pub mod errors;
pub mod repository;
pub mod config;
