pub mod message;
pub mod parse;
pub mod pipeline;
pub mod target;
