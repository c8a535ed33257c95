//! Facial atlas cycling for the Claire character demo.
//!
//! The engine (rendering, resources, animation, UI) is reached only through
//! [`engine::EngineHost`]; everything in this crate runs headless.

pub mod atlas_cycle;
pub mod character;
pub mod config;
pub mod engine;
pub mod face;
pub mod input;
pub mod replay;
pub mod time;
