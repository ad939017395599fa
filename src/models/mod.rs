pub mod booking;
pub mod report;
pub mod tour;
