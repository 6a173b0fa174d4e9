pub mod profile;
pub mod search;
