pub mod replay;
pub mod scripted;

pub use replay::{ReplaySource, ReplayStats};
pub use scripted::ScriptedSource;
