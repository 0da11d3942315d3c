pub mod ai;
pub mod api;
pub mod cli;
pub mod core;
pub mod corpus;
pub mod openai;
