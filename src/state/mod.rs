//! Process-wide attempt state

mod attempt;
mod store;

pub use attempt::{AttemptState, LiftType};
pub use store::StateStore;
