//! Best-market selection for the TDEX swap router.
//!
//! Pure and synchronous: given the aggregated markets and the user's pair,
//! decide the trade direction, the fees each market would charge, and the
//! market yielding the most for the user.

pub mod error;
pub mod fee;
pub mod selection;

pub use error::{RouterError, RouterResult};
pub use fee::{get_trade_type, total_market_fees};
pub use selection::{get_best_market, net_proceeds, route};
