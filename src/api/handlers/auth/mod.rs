//! Authentication, credential recovery, and the role gate.
//!
//! Login exchanges email/password for a signed bearer token. Recovery issues
//! a six-digit single-use code with a five-minute expiry and consumes it
//! atomically together with the password update. Every role-restricted
//! endpoint in the service resolves its caller through [`guard::authorize`].

pub(crate) mod guard;
pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod recovery;
mod storage;
pub(crate) mod token;
pub(crate) mod types;
mod utils;

pub use token::TokenKeys;
pub use types::Role;
