pub mod config;
pub mod constants;
pub mod errors;
#[cfg(feature = "evm")]
pub mod evm;
pub mod models;
pub mod path;
pub mod retry;
mod serde_primitives;
pub mod units;
