//! Cross-exchange top-of-book arbitrage scanner.
//!
//! Raw exchange payloads go through per-exchange adapters into a cycle
//! snapshot; the scanner pairs every exchange against every other per shared
//! pair and ranks fee-adjusted opportunities.

pub mod aggregator;
pub mod config;
pub mod cycle_manager;
pub mod error;
pub mod exchanges;
pub mod models;
pub mod pairs;
pub mod ranker;
pub mod routes;
pub mod scanner;
pub mod transport;
pub mod utils;
pub mod validator;
