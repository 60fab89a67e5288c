pub mod client;
pub mod lister;

pub use client::BuildkiteClient;
pub use lister::BuildkiteLister;
