//! tabletalk-web: HTTP service for TableTalk meal recommendations
//! Provides:
//!   - Personalised recommendations for nearby meals
//!   - Preference inspection, editing and reset
//!   - Interaction tracking for preference learning
//!   - A live event stream

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod sse;
pub mod state;
