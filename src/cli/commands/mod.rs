pub mod extract;
pub mod init;
pub mod manifest;
mod project;

pub use project::{Project, project_root};
