//! Request and response types for the HTTP contract

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
