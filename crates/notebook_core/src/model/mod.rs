//! Domain model for the topic/note document.
//!
//! # Responsibility
//! - Define the in-memory shape of the persisted snapshot.
//! - Own the structural invariants shared by every mutation path.
//!
//! # Invariants
//! - Topic names are unique within a document.
//! - A topic with zero notes is never persisted or observed.
//! - Note timestamps are captured once at creation and never rewritten.

pub mod document;
