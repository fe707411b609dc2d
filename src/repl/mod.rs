//! Interactive shell for the copilot
//!
//! rustyline input, colored output, built-in `help`/`reset`/`quit`
//! commands; everything else goes through the agent loop.

pub mod display;
pub mod session;

pub use display::DisplayManager;
pub use session::{parse, Command, ReplSession};
