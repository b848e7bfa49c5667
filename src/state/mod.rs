/// State management module
///
/// This module handles all application state, including:
/// - The filter session: inputs in, rendered output out (session.rs)
/// - The persisted usage counter behind the review prompt (usage.rs)

pub mod session;
pub mod usage;
