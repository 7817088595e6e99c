//! HTTP adapter between the scoring system and the recorder
//!
//! - POST /events - Queue a timing event (AttemptStart, DecisionGiven, SessionChanged)
//! - GET /status - Latest recorder status
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
