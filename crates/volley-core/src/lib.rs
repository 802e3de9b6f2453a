//! Core types and definitions for the VOLLEY combat subsystem.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry and time types, layer masks, configuration, commands,
//! events, snapshot views and ECS components.
//! It has no dependency on the ECS or on any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;

pub use glam;
