pub mod attendance_record;
pub mod course;
pub mod enrollment;
pub mod grade;
pub mod grade_configuration;
pub mod grade_score;
pub mod quiz;
pub mod quiz_score;
pub mod role;
pub mod role_permission;
pub mod schedule;
pub mod student;
pub mod user;
