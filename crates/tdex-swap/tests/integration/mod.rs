//! Integration tests for tdex-swap.
//!
//! These run the real HTTP clients against in-process mock providers:
//! - Registry and market discovery
//! - Best-market selection and preview
//! - Propose/complete negotiation

pub mod common;
