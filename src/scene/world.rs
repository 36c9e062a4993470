/// Capability-query component store.
///
/// Component data lives in per-type secondary maps keyed by a
/// generational entity key; a query iterates the entities that have every
/// component in the requested set. No runtime reflection — each
/// renderer-facing component pair gets an explicit query method.

use slotmap::{new_key_type, SecondaryMap, SlotMap};
use super::components::{Light, MeshRenderer, ParticleEmitter, Sprite, TextLabel, Transform};

new_key_type! {
    /// Generational entity handle
    pub struct Entity;
}

/// Entity bookkeeping held in the primary slot map
#[derive(Debug, Clone, Copy)]
struct EntityMeta {
    active: bool,
}

/// Component store with capability queries.
///
/// Inactive entities exist but are invisible to every query; the
/// visibility builder honors the flag by construction.
pub struct World {
    entities: SlotMap<Entity, EntityMeta>,
    transforms: SecondaryMap<Entity, Transform>,
    meshes: SecondaryMap<Entity, MeshRenderer>,
    sprites: SecondaryMap<Entity, Sprite>,
    lights: SecondaryMap<Entity, Light>,
    emitters: SecondaryMap<Entity, ParticleEmitter>,
    labels: SecondaryMap<Entity, TextLabel>,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            transforms: SecondaryMap::new(),
            meshes: SecondaryMap::new(),
            sprites: SecondaryMap::new(),
            lights: SecondaryMap::new(),
            emitters: SecondaryMap::new(),
            labels: SecondaryMap::new(),
        }
    }

    /// Spawn a new active entity with no components
    pub fn spawn(&mut self) -> Entity {
        self.entities.insert(EntityMeta { active: true })
    }

    /// Despawn an entity and all its components
    pub fn despawn(&mut self, entity: Entity) {
        self.entities.remove(entity);
        self.transforms.remove(entity);
        self.meshes.remove(entity);
        self.sprites.remove(entity);
        self.lights.remove(entity);
        self.emitters.remove(entity);
        self.labels.remove(entity);
    }

    /// Set the entity's active flag; inactive entities match no query
    pub fn set_active(&mut self, entity: Entity, active: bool) {
        if let Some(meta) = self.entities.get_mut(entity) {
            meta.active = active;
        }
    }

    /// Whether the entity exists and is active
    pub fn is_active(&self, entity: Entity) -> bool {
        self.entities.get(entity).map(|m| m.active).unwrap_or(false)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if no entity is alive
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ===== COMPONENT ATTACHMENT =====

    pub fn set_transform(&mut self, entity: Entity, transform: Transform) {
        if self.entities.contains_key(entity) {
            self.transforms.insert(entity, transform);
        }
    }

    pub fn set_mesh(&mut self, entity: Entity, mesh: MeshRenderer) {
        if self.entities.contains_key(entity) {
            self.meshes.insert(entity, mesh);
        }
    }

    pub fn set_sprite(&mut self, entity: Entity, sprite: Sprite) {
        if self.entities.contains_key(entity) {
            self.sprites.insert(entity, sprite);
        }
    }

    pub fn set_light(&mut self, entity: Entity, light: Light) {
        if self.entities.contains_key(entity) {
            self.lights.insert(entity, light);
        }
    }

    pub fn set_emitter(&mut self, entity: Entity, emitter: ParticleEmitter) {
        if self.entities.contains_key(entity) {
            self.emitters.insert(entity, emitter);
        }
    }

    pub fn set_label(&mut self, entity: Entity, label: TextLabel) {
        if self.entities.contains_key(entity) {
            self.labels.insert(entity, label);
        }
    }

    pub fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.transforms.get(entity)
    }

    // ===== CAPABILITY QUERIES =====

    /// All active entities having {Transform, MeshRenderer}
    pub fn query_meshes(&self) -> impl Iterator<Item = (Entity, &Transform, &MeshRenderer)> {
        self.meshes.iter().filter_map(move |(entity, mesh)| {
            if !self.is_active(entity) {
                return None;
            }
            let transform = self.transforms.get(entity)?;
            Some((entity, transform, mesh))
        })
    }

    /// All active entities having {Transform, Sprite}
    pub fn query_sprites(&self) -> impl Iterator<Item = (Entity, &Transform, &Sprite)> {
        self.sprites.iter().filter_map(move |(entity, sprite)| {
            if !self.is_active(entity) {
                return None;
            }
            let transform = self.transforms.get(entity)?;
            Some((entity, transform, sprite))
        })
    }

    /// All active entities having {Transform, Light}
    pub fn query_lights(&self) -> impl Iterator<Item = (Entity, &Transform, &Light)> {
        self.lights.iter().filter_map(move |(entity, light)| {
            if !self.is_active(entity) {
                return None;
            }
            let transform = self.transforms.get(entity)?;
            Some((entity, transform, light))
        })
    }

    /// All active entities having {Transform, ParticleEmitter}
    pub fn query_emitters(&self) -> impl Iterator<Item = (Entity, &Transform, &ParticleEmitter)> {
        self.emitters.iter().filter_map(move |(entity, emitter)| {
            if !self.is_active(entity) {
                return None;
            }
            let transform = self.transforms.get(entity)?;
            Some((entity, transform, emitter))
        })
    }

    /// All active entities having {Transform, TextLabel}
    pub fn query_labels(&self) -> impl Iterator<Item = (Entity, &Transform, &TextLabel)> {
        self.labels.iter().filter_map(move |(entity, label)| {
            if !self.is_active(entity) {
                return None;
            }
            let transform = self.transforms.get(entity)?;
            Some((entity, transform, label))
        })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
