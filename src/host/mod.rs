//! Host-facing contract, command router and stdio transport for the
//! presentation shell.

pub mod channel;
pub mod contract;
pub mod stdio;

pub use channel::{CommandHandler, EventSink, HostCommandClient, HostCommandServer};
pub use contract::{CommandEnvelope, CommandName, EventEnvelope, EventName, ResponseEnvelope};
pub use stdio::{run_bridge, run_stdio_bridge};
