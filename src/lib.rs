//! Entitlement Engine - In-App Subscription Entitlement Resolution
//!
//! This crate reconciles asynchronous transaction-verification results,
//! current-entitlement snapshots, and locally cached state into one
//! authoritative subscription status for the embedding application.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
