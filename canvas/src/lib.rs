//! Floor-plan canvas engine for the restaurant POS client.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! editing lifecycle of a floor plan: translating raw pointer, touch and wheel
//! events into table moves, maintaining the viewport for pan/zoom, hit-testing
//! tables, generating chair geometry, and drawing the scene. The host layer is
//! responsible only for wiring DOM events to the engine and persisting the
//! resulting [`engine::Action`]s through the floor/table service.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Floors, tables, shapes and the in-memory store |
//! | [`camera`] | Viewport zoom/pan and screen/logical conversions |
//! | [`input`] | Input event types and the interaction session |
//! | [`hit`] | Hit-testing against tables |
//! | [`seats`] | Chair placement around each table shape |
//! | [`render`] | Scene rendering to a 2D context |
//! | [`consts`] | Shared numeric constants (canvas size, zoom limits, etc.) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod render;
pub mod seats;
