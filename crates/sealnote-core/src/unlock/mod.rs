//! Remote unlock.
//!
//! A locked device opens a relay session and publishes an
//! [`UnlockRequest`] link. A second device holding a registered credential
//! signs the challenge and posts the assertion to the relay. The first
//! device polls, verifies the assertion against the stored public key and
//! its own copy of the challenge, and consumes the session.
//!
//! The result is authentication only. No wrapping material crosses the
//! relay, so unlocking notes still requires the passphrase.

mod client;
mod orchestrator;
mod request;
mod responder;

pub use client::{RelayClient, SessionStatus};
pub use orchestrator::{
    CancelHandle, PendingUnlock, RemoteUnlock, RemoteUnlockOutcome, UnlockConfig,
    DEFAULT_POLL_INTERVAL,
};
pub use request::UnlockRequest;
pub use responder::respond;
