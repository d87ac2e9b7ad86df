//! Feedback Gateway
//!
//! Client for the external scoring service and the glue that attaches its
//! replies to answers.

#![warn(missing_docs)]

pub mod error;
pub mod request;
pub mod client;
pub mod service;

pub use error::{FeedbackError, Result};
pub use request::{FeedbackRequest, FeedbackResponse, OutcomeDetails, TaskDetails, DEFAULT_FEEDBACK_TYPE};
pub use client::{FeedbackClient, FeedbackGateway, DEFAULT_TIMEOUT};
pub use service::{Applied, FeedbackService, PendingFeedback, ERROR_PREFIX};
