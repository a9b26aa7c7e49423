//! Format validators — pure predicates over strings and amounts.
//!
//! Failure returns `false`; nothing here raises.

mod cui;
mod money;
mod nit;
mod uuid;

pub use cui::*;
pub use money::*;
pub use nit::*;
pub use uuid::*;
