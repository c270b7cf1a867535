//! # Presenza (Identity & Attendance)
//!
//! `presenza` is the identity and attendance backend of the internal company
//! portal. It owns credential issuance and verification, one-time-password
//! credential recovery, and the per-employee daily attendance ledger.
//!
//! ## Identity & Tokens
//!
//! Login exchanges an email/password pair for a signed bearer token (HS256,
//! valid for seven days). Every role-restricted endpoint resolves the token
//! through a single access guard; there are no per-route role checks.
//!
//! ## Credential Recovery (OTP)
//!
//! Password recovery issues a six-digit single-use code with a five-minute
//! expiry, delivered through an injected email channel. Consumption is an
//! atomic conditional update: a code is marked consumed and the password
//! digest replaced in one transaction, so racing resets cannot both succeed.
//!
//! ## Attendance Ledger
//!
//! One record per (employee, local calendar day), enforced by a unique
//! constraint. Check-in creates the record, check-out completes it and
//! derives hours worked and the day's status. Concurrent stamps are resolved
//! by the store's conditional writes, never by in-process locks.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
