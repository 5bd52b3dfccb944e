//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie header
//!     → cookie.rs (find the session cookie)
//!     → codec.rs (shape check, signature check, expiry)
//!     → Session or nothing
//!
//! Login exchange:
//!     accessToken → codec.rs (must decode) → cookie.rs (Set-Cookie)
//! ```
//!
//! # Design Decisions
//! - Decoding is pure and never errors; failure means "no session"
//! - Sessions are replaced, never mutated; expiry is lazy

pub mod codec;
pub mod cookie;

pub use codec::{is_well_formed, Role, Session, SessionCodec};
pub use cookie::{read_cookie, CookieSpec};
