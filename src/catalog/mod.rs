//! Rule catalog — the declarative data the engine interprets.
//!
//! Document types, tax configurations, phrase scenarios, currencies,
//! INCOTERMs, subsidized products, establishment classes, and the Spanish
//! error taxonomy. Nothing here can fail; everything is versioned with the
//! rulebook edition surfaced in verdicts.

mod complement;
mod currency;
mod dte;
mod establishment;
mod incoterm;
mod messages;
mod phrase;
mod product;
mod tax;

pub use complement::*;
pub use currency::*;
pub use dte::*;
pub use establishment::*;
pub use incoterm::*;
pub use messages::*;
pub use phrase::*;
pub use product::*;
pub use tax::*;
