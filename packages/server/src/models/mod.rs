pub mod attendance;
pub mod auth;
pub mod course;
pub mod grade;
pub mod shared;
pub mod student;
pub mod user;
