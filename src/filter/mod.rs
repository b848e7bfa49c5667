/// Filter catalog and rendering engine
///
/// This module handles:
/// - The fixed set of filter kinds and their accepted parameters (kind.rs)
/// - Mapping the intensity slider onto per-filter parameters (kind.rs)
/// - Rendering an output bitmap from a filter configuration (engine.rs)

pub mod engine;
pub mod kind;
