pub mod bot_platform;
pub mod dbl_api;
