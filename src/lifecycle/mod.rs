//! Lifecycle module
//!
//! Timers and host events around the engine: periodic autosave, eviction on
//! departure, the final flush at shutdown, and playtime XP.

mod autosave;
mod playtime;
mod scheduler;

pub use autosave::*;
pub use playtime::*;
pub use scheduler::*;
