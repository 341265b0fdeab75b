pub mod clipboard;
pub mod error;
pub mod notify;
pub mod url;
