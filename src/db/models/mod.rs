//! Database models split into domain-specific modules.

pub mod approval;
pub mod assignment;
pub mod common;
pub mod session;
pub mod site;
pub mod stats;
pub mod user;
pub mod valet;
pub mod vehicle;

pub use approval::*;
pub use assignment::*;
pub use common::*;
pub use session::*;
pub use site::*;
pub use stats::*;
pub use user::*;
pub use valet::*;
pub use vehicle::*;
