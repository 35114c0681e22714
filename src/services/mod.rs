pub mod cache;
pub mod signal_service;
pub mod signals;
pub mod tick_store;

pub use cache::Cache;
pub use signal_service::{FetchLimits, SignalService};
pub use signals::{SignalEngine, TimeframeSeries};
pub use tick_store::{TickPoller, TickStore};
