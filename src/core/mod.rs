pub mod cluster;
pub mod engine;
pub mod features;
pub mod fingerprint;
pub mod hero;
pub mod inventory;
pub mod ordering;
