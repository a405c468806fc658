//! MCP front end

mod server;

pub use server::MacrotrackService;
