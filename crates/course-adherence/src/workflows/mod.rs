pub mod adherence;
pub mod dispatch;
pub mod enrollments;
