//! Play session
//!
//! Walks the player through the combo script forever, timing every hit and
//! every full pass, and remembers the fastest pass of the run.

pub mod combo;
pub mod session;

pub use combo::ComboScript;
pub use session::{Hit, PassResult, PlaySession, PlayUpdate, SessionCursor};
