pub mod lookup;
pub mod types;
pub mod verify;
pub mod error;
