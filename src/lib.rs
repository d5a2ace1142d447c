//! Fleet analytics engine.
//!
//! Turns a trip/fuel log and four reference tables (route contracts, truck
//! registry, cost schedule, distance tracker) into revenue, cost, profit,
//! fuel efficiency, compliance status and pricing advice.
//!
//! Every stage is a pure function over borrowed tables:
//! [`filter`] → [`join`] → [`metrics`] → [`aggregate`] → [`recommend`],
//! with [`compliance`] running on the truck registry alone. [`pipeline`]
//! chains the per-record stages; [`loader`] is the CSV data source.

pub mod aggregate;
pub mod compliance;
pub mod config;
pub mod error;
pub mod filter;
pub mod join;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod recommend;
pub mod summary;
pub mod types;
pub mod util;

pub use config::EngineConfig;
pub use error::{ConfigError, Error, Result};
pub use filter::{Period, Selector};
pub use pipeline::{analyze, Analysis, Query};
pub use types::SourceTables;
