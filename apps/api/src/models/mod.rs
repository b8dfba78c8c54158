pub mod chat;
pub mod learning;
