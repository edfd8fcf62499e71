//! Agent session engine for jorin.
//!
//! A [`SessionDriver`] runs the turn loop against any
//! [`jorin_llm::ProtocolAdapter`], dispatching tool calls through a
//! [`ToolRegistry`] gated by a [`Policy`].

pub mod arguments;
pub mod cancel;
pub mod config;
pub mod errors;
pub mod execution;
pub mod policy;
pub mod session;
pub mod tools;
pub mod truncation;

pub use arguments::*;
pub use cancel::*;
pub use config::*;
pub use errors::*;
pub use execution::*;
pub use policy::*;
pub use session::*;
pub use tools::*;
pub use truncation::*;
