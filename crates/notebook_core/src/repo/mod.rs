//! Repository layer over the document store.
//!
//! # Responsibility
//! - Express add/list/delete use-cases as store transactions.
//! - Return semantic errors (`TopicNotFound`, `NoteNotFound`,
//!   `StoreNotFound`) in addition to store write failures.
//!
//! # Invariants
//! - Every repository call is exactly one store critical section.
//! - Returned records are owned copies; nothing borrows the document.

pub mod note_repo;
