//! Host side of the floor-plan editor.
//!
//! DESIGN
//! ======
//! The `canvas` crate owns the editing state and never performs I/O. This
//! crate connects it to the POS backend: the collaborator contract
//! ([`service::FloorService`], [`service::TableService`]), its REST binding
//! ([`service::http::HttpFloorService`]), and [`store::FloorPlanStore`], which
//! applies collaborator results to the engine with optimistic-update rules.
//!
//! ERROR HANDLING
//! ==============
//! Collaborator failures surface as [`error::ServiceError`] and are also
//! recorded on the store as a [`store::Notice`] for the UI. Local state is
//! only changed after the collaborator succeeds.

pub mod config;
pub mod error;
pub mod service;
pub mod store;
