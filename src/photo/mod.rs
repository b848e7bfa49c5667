/// Photo import and export
///
/// This module handles:
/// - Loading a picked photo file into an RGBA bitmap (loader.rs)
/// - Exporting the filtered result to a user-chosen file (share.rs)

pub mod loader;
pub mod share;
