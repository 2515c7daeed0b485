pub mod cases;
pub mod citizens;
pub mod search;
pub mod session;
