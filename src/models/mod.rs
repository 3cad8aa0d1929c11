pub mod admin;
pub mod application;
pub mod contact;
pub mod content;
pub mod media;

pub use admin::*;
pub use application::*;
pub use contact::*;
pub use content::*;
pub use media::*;
