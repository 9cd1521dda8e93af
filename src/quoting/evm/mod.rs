pub mod client;
pub mod quoter;
pub mod utils;
