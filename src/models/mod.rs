pub mod coding_challenge;
pub mod mcq;
pub mod settings;
