//! # Agora Core
//!
//! The domain layer of Agora's content feeds.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! content types, the publication state evaluator, the feed visibility policy
//! and the content store port.

pub mod domain;
pub mod error;
pub mod feed;
pub mod lifecycle;
pub mod ports;

pub use error::{DomainError, EvaluationError, FeedError, StoreError};
