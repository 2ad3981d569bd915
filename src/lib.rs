pub mod config;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod render;
pub mod repl;
pub mod server;
pub mod session;

pub use config::Config;
pub use error::{PiiGraphError, Result};
pub use graph::{Edge, GraphSnapshot, Node};
pub use session::{GraphSession, Renderer};
