pub mod posting;
pub mod profile;
pub mod user;
