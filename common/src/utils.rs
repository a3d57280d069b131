pub mod input;
pub mod interface;
