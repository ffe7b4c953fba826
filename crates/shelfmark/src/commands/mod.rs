//! CLI command handlers.

pub mod hash_password;
pub mod serve;

/// Shared context passed to every command.
pub struct Context {
    /// Print extra detail while running.
    pub verbose: bool,
}
