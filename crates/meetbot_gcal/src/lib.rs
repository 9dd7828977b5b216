// --- File: crates/meetbot_gcal/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
pub mod logic;
#[cfg(test)]
mod logic_dst_test;
#[cfg(test)]
mod logic_proptest;
pub mod service;

pub use logic::{compute_slots, search_window, SchedulingParams, SearchWindow, SlotFinder};
pub use service::GoogleCalendarService;
