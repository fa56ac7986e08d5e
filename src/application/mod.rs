pub mod alert_board;
pub mod handlers;
pub mod refresh;
pub mod session;
