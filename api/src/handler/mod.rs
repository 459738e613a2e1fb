pub mod booking;
pub mod health;
