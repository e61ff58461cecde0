pub mod assessments;
pub mod health;
pub mod tasks;
