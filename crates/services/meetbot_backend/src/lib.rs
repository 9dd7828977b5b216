// --- File: crates/services/meetbot_backend/src/lib.rs ---
pub mod cli; // Command line parsing
pub mod service_factory; // Wiring of collaborators
