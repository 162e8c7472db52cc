pub mod achievements;
pub mod catalog;
pub mod evaluator;
pub mod notification;
pub mod tracker;
