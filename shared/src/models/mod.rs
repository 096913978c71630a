//! Data models for the dispatch register
//!
//! Plain serde structs shared between the server and its tests. Database
//! derives (`sqlx::FromRow`) are gated behind the `db` feature so non-server
//! consumers stay free of sqlx.

pub mod contact;
pub mod dispatch;
pub mod sequence;
pub mod user;

pub use contact::{Contact, ContactCreate, ContactUpdate};
pub use dispatch::{DispatchCreate, DispatchRecord, Section};
pub use sequence::{Allocation, DispatchSequence};
pub use user::User;
