//! Marker traits separating writes from reads
//!
//! Commands change stored comments; queries never do. Request types opt in
//! with an empty impl next to their `mediator::Request` impl.

/// A request that writes to the comments table
pub trait Command {}

/// A request that only reads
pub trait Query {}
