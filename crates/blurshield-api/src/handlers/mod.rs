pub mod detect;
pub mod export;
pub mod health;
pub mod stream;
pub mod upload;
