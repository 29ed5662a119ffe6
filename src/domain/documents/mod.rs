pub mod content;
pub mod document;
