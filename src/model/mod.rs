pub mod album;
pub mod photo;
pub mod user;

pub use album::{Album, PhotoPage};
pub use photo::Photo;
pub use user::UserIdentity;
