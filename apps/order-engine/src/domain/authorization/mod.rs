//! Authorization bounded context: pure access decisions and list-query
//! narrowing.

mod actor;
mod engine;

pub use actor::{Actor, Role};
pub use engine::{Access, AuthorizationEngine, FilterDenial};
