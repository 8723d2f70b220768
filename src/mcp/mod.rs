pub mod server;

pub use server::{DictionaryMcpServer, run_server};
