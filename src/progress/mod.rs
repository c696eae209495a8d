//! Player progress module
//!
//! Per-player state, its durable record format, and the cache that owns it.

mod record;
mod state;
mod store;


pub use record::*;
pub use state::*;
pub use store::*;
