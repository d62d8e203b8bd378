pub mod doctor;
pub mod health;
