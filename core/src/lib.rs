//! Cancellable HTTP request primitive.
//!
//! # Overview
//! A request is built as plain data (`HttpRequest`), then handed to a
//! `Requester` that dispatches it in a background task while a second task
//! fires a `CancellationToken` after a fixed delay. Whichever finishes first
//! decides the single result delivered back to the caller.
//!
//! # Design
//! - The `reqwest::Client` is passed into `Requester::new`; nothing is global.
//! - Cancellation is cooperative: the round trip is raced against the token
//!   and dropped when the token wins.
//! - Cancellation has its own error variant, `RequestError::Cancelled`.

pub mod error;
pub mod http;
pub mod requester;

pub use error::RequestError;
pub use http::{encode_form, HttpRequest, HttpResponse};
pub use requester::{cancel_after_delay, Requester};
pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;
