//! Backend-facing half of jorin: the conversation model and the two wire
//! protocols (stateless chat completions, stateful responses) behind one
//! [`ProtocolAdapter`] contract.

pub mod completions;
pub mod config;
pub mod errors;
pub mod provider;
pub mod responses;
pub mod transcript;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use completions::*;
pub use config::*;
pub use errors::*;
pub use provider::*;
pub use responses::*;
pub use transcript::*;
pub use transport::*;
pub use types::*;
