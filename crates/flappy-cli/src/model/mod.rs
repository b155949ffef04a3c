pub mod ai_model;
pub mod history;
