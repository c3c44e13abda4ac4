//! Data models
//!
//! Shared between pronto-server and its clients (via API).
//! All IDs are `u64`, allocated by the server store.

pub mod employee;
pub mod menu;
pub mod modification;
pub mod order;
pub mod role;
pub mod session;
pub mod split_bill;

// Re-exports
pub use employee::*;
pub use menu::*;
pub use modification::*;
pub use order::*;
pub use role::*;
pub use session::*;
pub use split_bill::*;
