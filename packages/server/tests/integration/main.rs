
mod attendance;
mod courses;
mod grades;
