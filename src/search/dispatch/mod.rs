//! Asynchronous, non-blocking delivery of index commands
//!
//! The primary write path calls [`DispatchChannel::send`], which only
//! pushes onto a bounded in-memory queue. A fixed pool of tokio workers
//! drains the queue and talks to the search server through an
//! [`IndexTransport`].
//!
//! # Architecture
//!
//! - `switch` - Process-wide enable/disable toggle, injected
//! - `queue` - Bounded queue with drop-oldest / drop-newest back-pressure
//! - `stats` - Lock-free counters
//! - `channel` - Caller-side handle (`send`, `wait_idle`)
//! - `service` - Worker pool with per-batch deduplication and bounded attempts
//! - `transport` - HTTP protocol to the search server
//!
//! # Example
//!
//! ```ignore
//! let switch = SyncSwitch::new(config.enabled());
//! let transport = Arc::new(SolrHttpTransport::new(&config)?);
//! let (workers, channel) = DispatchWorkers::start(&config, transport, switch);
//!
//! channel.send(IndexCommand::delete("t1".into()));
//! workers.shutdown(Duration::from_secs(5)).await;
//! ```

mod channel;
mod queue;
mod service;
mod stats;
mod switch;
mod transport;

pub use channel::{DispatchChannel, SendStatus};
pub use service::DispatchWorkers;
pub use stats::{DispatchStats, DispatchStatsSnapshot};
pub use switch::SyncSwitch;
pub use transport::{IndexTransport, SolrHttpTransport};
