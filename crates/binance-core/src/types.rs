//! Core domain types for futures order placement.

pub mod order;

pub use order::*;
