pub mod attendance;
pub mod core;
pub mod exports;
pub mod rollcall;
pub mod students;
