pub mod context;
pub mod patient;
pub mod score;
pub mod template;
