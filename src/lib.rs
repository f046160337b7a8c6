//! Quotagate - Distributed Admission-Control Gate
//!
//! This crate implements an admission-control gate: every incoming request is
//! decided ALLOW or DENY against a per-key quota shared across service
//! instances through a central Redis counting store, with a process-local
//! fallback strategy for when shared counting is not desired. The decision
//! pipeline fails open under any internal error so that a broken rate limiter
//! never becomes an outage amplifier.

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod ratelimit;
pub mod store;
