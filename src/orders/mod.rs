//! Order identity and lifecycle tracking.
//!
//! - `ids`: strictly increasing client order ids
//! - `registry`: every order this agent has at the exchange, with side and status

mod ids;
mod registry;

pub use ids::OrderIdAllocator;
pub use registry::{OrderRegistry, OrderState, StatusTransition, TrackedOrder};
