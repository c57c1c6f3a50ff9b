//! Library facade - re-export internal modules so integration
//! tests or external code can use `tcping_latency::...`.

pub mod cli;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod probe;
pub mod prober;
pub mod request;
pub mod resolve;
pub mod sockopt;
pub mod stats;

pub use prober::{ProbeEvent, ProbeHandle, ProbeListener, ProbeState, Prober, ProberConfig};
pub use request::{ProbeId, ProbeRequest, ProbeRequestBuilder};
pub use stats::{LATENCY_UNMEASURABLE, ProbeResult};
