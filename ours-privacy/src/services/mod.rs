//! Endpoint groups exposed off [`crate::Client`].
//!
//! Each service borrows the client, so they are cheap to construct per
//! call. Every endpoint comes in a typed flavor and a `_raw` flavor taking
//! a loose JSON mapping; both run the same converter dump, which passes
//! unknown keys through untouched.

mod identify;
mod track;
mod visitor;

pub use identify::IdentifyService;
pub use track::TrackService;
pub use visitor::VisitorService;
