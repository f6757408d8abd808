//! Use-case services over stores and engine.
//!
//! # Responsibility
//! - Wire stores, engine and playback updates into host-facing calls.
//! - Keep hosts (CLI, UI bindings) decoupled from repository details.

pub mod listening_service;
