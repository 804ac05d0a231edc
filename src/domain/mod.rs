//! Domain layer
//!
//! Value objects, entities, pure services and the ports the application layer
//! talks through. Nothing here spawns processes.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
