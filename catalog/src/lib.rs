//! Incremental catalog merge and versioning for vehicle-listing data.
//!
//! This crate reconciles freshly fetched listing records against a previously
//! persisted dataset. Each vehicle identifier has at most one active snapshot
//! at a time; superseded snapshots are kept as inactive history instead of
//! being overwritten.
//!
//! # Architecture
//!
//! Raw source records flow through a per-source [`translate::Translator`]
//! into [`types::CanonicalRecord`] values. The [`merge::MergeEngine`] folds
//! them into a [`dataset::Dataset`], consulting a [`freshness::FreshnessPolicy`]
//! to decide whether an existing entry is still current and detecting changes
//! on a fixed set of tracked fields. Stores under [`store`] own durability;
//! [`pipeline::Pipeline`] drives the batch loop with a checkpoint save after
//! every batch so partial progress survives a crash.

pub mod conversions;
pub mod dataset;
pub mod error;
pub mod freshness;
pub mod merge;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod translate;
pub mod types;
