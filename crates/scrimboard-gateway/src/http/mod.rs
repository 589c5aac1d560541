pub mod availability;
pub mod error;
pub mod health;
pub mod players;
pub mod scrims;
