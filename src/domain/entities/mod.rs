pub mod alert;
pub mod sale;
