pub mod meetup;
pub mod server_runner;

pub use meetup::MeetupServer;
pub use server_runner::{serve, McpCommand};
