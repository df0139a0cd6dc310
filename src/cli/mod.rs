pub mod commands;
pub mod session;

pub use commands::CliArgs;
pub use session::ChatSession;
