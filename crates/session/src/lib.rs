//! Session state for the NGOConnect client
//!
//! Holds the two bearer credentials (access + refresh) in a key-value store
//! that mirrors browser local storage, and performs the unauthenticated token
//! endpoint calls that mint them.
//!
//! Token lifecycle:
//! 1. `token::obtain_pair()` on sign-in → `SessionStore::store_tokens()`
//! 2. Every authenticated request reads `SessionStore::access_token()`
//! 3. On 401 the secure client calls `token::refresh_access()` with
//!    `SessionStore::refresh_token()` and stores the result
//! 4. Sign-out or an irrecoverable refresh failure calls `SessionStore::clear()`

pub mod constants;
pub mod error;
pub mod store;
pub mod token;

pub use constants::*;
pub use error::{Error, Result};
pub use store::{SessionStore, SessionTokens};
pub use token::{Credentials, TokenPair, obtain_pair, refresh_access};
