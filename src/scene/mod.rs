//! Scene module
//!
//! Component structs and the capability-query world the visibility
//! builder reads. The world is an external collaborator from the
//! renderer's point of view: the renderer only iterates it.

mod aabb;
mod components;
mod world;

pub use aabb::Aabb;
pub use components::{
    Font, Glyph, Light, LightKind, Material, Mesh, MeshRenderer, Particle, ParticleEmitter,
    RenderFlags, Sprite, TextLabel, Transform,
};
pub use world::{Entity, World};
