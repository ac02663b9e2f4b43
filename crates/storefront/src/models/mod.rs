//! Types stored in or shared across request handling.

pub mod session;

pub use session::keys as session_keys;
