//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates exchange data only through the types defined here.
//!
//! ## Ordering Model
//! - Every `QueryBlob` carries a 0-based position assigned when the input
//!   sequence is built
//! - Outcomes are keyed by that position, never by completion order

mod caller;
mod config;
mod error;
mod outcome;
mod query;
mod sink;

pub use caller::{caller_fn, FnCaller, LocalRemoteCaller, RemoteCaller};
pub use config::*;
pub use error::*;
pub use outcome::*;
pub use query::{QueryBlob, QueryDefinition, QUERY_SHAPE_COUNT};
pub use sink::*;
