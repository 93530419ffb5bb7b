//! TDEX swap router.
//!
//! Finds the best TDEX market for a swap across every provider listed in
//! the network registry:
//! - Provider discovery and market aggregation
//! - Fee-aware best-market selection
//! - Trade preview, and the propose/complete negotiation

pub mod app;
pub mod config;
pub mod error;

pub use app::{Application, SwapQuote};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
