//! Bilateral interest handshake layered over preference matches.
//!
//! Per ordered pair (A, B) the state is derived purely from which of the two
//! directed [`InterestRecord`](crate::types::InterestRecord)s exist. Contact
//! details are only disclosed in [`InterestState::MutuallyConfirmed`].

mod handshake;
mod state;

pub use handshake::{accept_interest, express_interest, remove_match, withdraw_interest};
pub use state::{InterestFlags, InterestLedger, InterestState};
