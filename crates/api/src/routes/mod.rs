pub mod health;
pub mod views;
