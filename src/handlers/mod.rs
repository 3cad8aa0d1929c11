pub mod careers;
pub mod contact;
pub mod content;
pub mod media;
