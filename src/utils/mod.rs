pub mod links;
pub mod mime;
