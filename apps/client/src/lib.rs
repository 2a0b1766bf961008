//! Client side of a review session.
//!
//! Provides:
//! - `ReviewSession`: the session orchestrator (start, flip, rate) with
//!   automatic retry of ratings lost to network failures
//! - `ReviewSessionState`: the state machine it drives, observable by a UI
//! - `ReviewApi`: the collaborator contract, with an HTTP implementation

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod retry;
pub mod session;
pub mod state;
pub mod summary;

pub use api::{ApiFailure, FetchOutcome, ReviewApi};
pub use config::ClientConfig;
pub use error::SessionError;
pub use http::HttpReviewApi;
pub use retry::RetryPolicy;
pub use session::{Notice, RateOutcome, ReviewSession, StartOutcome};
pub use state::{IgnoreReason, Phase, ReviewSessionState, Side};
pub use summary::SessionSummary;
