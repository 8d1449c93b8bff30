pub mod avatar;
pub mod bot;
pub mod search;
pub mod stats;
pub mod user;
