//! Scene store: entities, their components and the draw order the renderer
//! walks.

use sprig_core::world::{Entities, Entity, HierarchyError, Storage, Transform};
use sprig_render::{Camera2D, Sprite};
use sprig_text::TextRun;
use thiserror::Error;

/// Something the renderer can draw. An entity without one is not drawn.
#[derive(Debug, Clone)]
pub enum Drawable {
    Sprite(Sprite),
    Text(TextRun),
}

impl From<Sprite> for Drawable {
    fn from(sprite: Sprite) -> Self {
        Drawable::Sprite(sprite)
    }
}

impl From<TextRun> for Drawable {
    fn from(run: TextRun) -> Self {
        Drawable::Text(run)
    }
}

/// A drawable with its world transform, in draw order.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub entity: Entity,
    pub drawable: &'a Drawable,
    pub transform: Transform,
}

/// What the frame driver needs from a scene.
pub trait SceneView {
    /// The camera to render through, if any.
    fn find_camera(&self) -> Option<&Camera2D>;

    /// Every drawable, in the order it must be submitted.
    fn drawables(&self) -> impl Iterator<Item = DrawItem<'_>>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    #[error("entity {0:?} has no camera")]
    NotACamera(Entity),
}

/// Entity arena plus transform, drawable and camera components.
///
/// Draw order is a depth-first walk of the hierarchy: roots in spawn order,
/// children right after their parent in attachment order. World positions add
/// up along the parent chain; an entity without a [`Transform`] contributes
/// nothing to its children's position and draws at its parent's.
#[derive(Default)]
pub struct Scene {
    entities: Entities,
    transforms: Storage<Transform>,
    drawables: Storage<Drawable>,
    cameras: Storage<Camera2D>,
    active_camera: Option<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn spawn(&mut self) -> Entity {
        self.entities.spawn()
    }

    pub fn spawn_sprite(&mut self, sprite: Sprite, transform: Transform) -> Entity {
        let entity = self.spawn();
        self.transforms.insert(entity, transform);
        self.drawables.insert(entity, Drawable::Sprite(sprite));
        entity
    }

    pub fn spawn_text(&mut self, run: TextRun, transform: Transform) -> Entity {
        let entity = self.spawn();
        self.transforms.insert(entity, transform);
        self.drawables.insert(entity, Drawable::Text(run));
        entity
    }

    /// Spawn a camera entity. It becomes active if no camera is.
    pub fn spawn_camera(&mut self, camera: Camera2D) -> Entity {
        let entity = self.spawn();
        self.attach_camera(entity, camera);
        entity
    }

    fn ensure_alive(&self, entity: Entity) -> Result<(), SceneError> {
        if self.entities.is_alive(entity) {
            Ok(())
        } else {
            Err(HierarchyError::StaleEntity(entity).into())
        }
    }

    pub fn insert_transform(
        &mut self,
        entity: Entity,
        transform: Transform,
    ) -> Result<Option<Transform>, SceneError> {
        self.ensure_alive(entity)?;
        Ok(self.transforms.insert(entity, transform))
    }

    pub fn insert_drawable(
        &mut self,
        entity: Entity,
        drawable: impl Into<Drawable>,
    ) -> Result<Option<Drawable>, SceneError> {
        self.ensure_alive(entity)?;
        Ok(self.drawables.insert(entity, drawable.into()))
    }

    pub fn remove_drawable(&mut self, entity: Entity) -> Option<Drawable> {
        self.drawables.remove(entity)
    }

    /// Attach a camera to `entity`. It becomes active if no camera is.
    pub fn insert_camera(
        &mut self,
        entity: Entity,
        camera: Camera2D,
    ) -> Result<Option<Camera2D>, SceneError> {
        self.ensure_alive(entity)?;
        Ok(self.attach_camera(entity, camera))
    }

    fn attach_camera(&mut self, entity: Entity, camera: Camera2D) -> Option<Camera2D> {
        if self.active_camera.is_none() {
            self.active_camera = Some(entity);
        }
        self.cameras.insert(entity, camera)
    }

    pub fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.transforms.get(entity)
    }

    pub fn transform_mut(&mut self, entity: Entity) -> Option<&mut Transform> {
        self.transforms.get_mut(entity)
    }

    pub fn drawable(&self, entity: Entity) -> Option<&Drawable> {
        self.drawables.get(entity)
    }

    pub fn drawable_mut(&mut self, entity: Entity) -> Option<&mut Drawable> {
        self.drawables.get_mut(entity)
    }

    pub fn camera(&self, entity: Entity) -> Option<&Camera2D> {
        self.cameras.get(entity)
    }

    pub fn camera_mut(&mut self, entity: Entity) -> Option<&mut Camera2D> {
        self.cameras.get_mut(entity)
    }

    pub fn active_camera(&self) -> Option<Entity> {
        self.active_camera
    }

    /// Choose the camera to render through; `None` falls back to the first
    /// camera in draw order.
    pub fn set_active_camera(&mut self, camera: Option<Entity>) -> Result<(), SceneError> {
        if let Some(entity) = camera {
            self.ensure_alive(entity)?;
            if !self.cameras.contains(entity) {
                return Err(SceneError::NotACamera(entity));
            }
        }
        self.active_camera = camera;
        Ok(())
    }

    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<(), SceneError> {
        self.entities.set_parent(child, parent)?;
        Ok(())
    }

    /// Remove `entity` and its components. Its children become roots.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), SceneError> {
        self.entities.despawn(entity)?;
        self.transforms.remove(entity);
        self.drawables.remove(entity);
        self.cameras.remove(entity);
        if self.active_camera == Some(entity) {
            self.active_camera = None;
            if !self.cameras.is_empty() {
                tracing::warn!(
                    "active camera {entity:?} despawned; falling back to the first camera in draw order"
                );
            }
        }
        Ok(())
    }

    /// Local transforms summed along the parent chain. Scale is the entity's
    /// own.
    pub fn world_transform(&self, entity: Entity) -> Transform {
        let local = self.transforms.get(entity).copied().unwrap_or_default();
        self.entities
            .ancestors_inclusive(entity)
            .skip(1)
            .filter_map(|ancestor| self.transforms.get(ancestor))
            .fold(local, |acc, parent| Transform {
                position: acc.position + parent.position,
                scale: acc.scale,
            })
    }
}

impl SceneView for Scene {
    fn find_camera(&self) -> Option<&Camera2D> {
        if let Some(camera) = self.active_camera.and_then(|e| self.cameras.get(e)) {
            return Some(camera);
        }
        self.entities
            .depth_first()
            .find_map(|entity| self.cameras.get(entity))
    }

    fn drawables(&self) -> impl Iterator<Item = DrawItem<'_>> {
        self.entities.depth_first().filter_map(|entity| {
            self.drawables.get(entity).map(|drawable| DrawItem {
                entity,
                drawable,
                transform: self.world_transform(entity),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use sprig_render::TextureId;

    fn sprite(id: u64) -> Sprite {
        Sprite::new(TextureId(id))
    }

    fn textures(scene: &Scene) -> Vec<u64> {
        scene
            .drawables()
            .map(|item| match item.drawable {
                Drawable::Sprite(s) => s.texture.0,
                Drawable::Text(_) => 0,
            })
            .collect()
    }

    #[test]
    fn draw_order_is_depth_first() {
        let mut scene = Scene::new();
        let a = scene.spawn_sprite(sprite(1), Transform::default());
        let b = scene.spawn_sprite(sprite(2), Transform::default());
        let a1 = scene.spawn_sprite(sprite(3), Transform::default());
        scene.set_parent(a1, Some(a)).unwrap();
        let b1 = scene.spawn_sprite(sprite(4), Transform::default());
        scene.set_parent(b1, Some(b)).unwrap();

        assert_eq!(textures(&scene), vec![1, 3, 2, 4]);
    }

    #[test]
    fn child_position_is_relative_to_parent() {
        let mut scene = Scene::new();
        let parent = scene.spawn_sprite(sprite(1), Transform::from_xy(10.0, 5.0));
        let group = scene.spawn();
        scene.set_parent(group, Some(parent)).unwrap();
        let child = scene.spawn_sprite(
            sprite(2),
            Transform::new(Vec3::new(1.0, 2.0, 3.0), Vec2::splat(4.0)),
        );
        scene.set_parent(child, Some(group)).unwrap();

        let world = scene.world_transform(child);
        assert_eq!(world.position, Vec3::new(11.0, 7.0, 3.0));
        assert_eq!(world.scale, Vec2::splat(4.0));
    }

    #[test]
    fn entities_without_drawables_are_skipped() {
        let mut scene = Scene::new();
        scene.spawn();
        scene.spawn_camera(Camera2D::new(Vec2::ZERO, 1.0, 10.0));
        let e = scene.spawn_sprite(sprite(9), Transform::default());
        assert_eq!(textures(&scene), vec![9]);

        scene.remove_drawable(e);
        assert_eq!(scene.drawables().count(), 0);
    }

    #[test]
    fn explicit_camera_wins_over_first() {
        let mut scene = Scene::new();
        let first = scene.spawn_camera(Camera2D::new(Vec2::ZERO, 1.0, 10.0));
        let second = scene.spawn_camera(Camera2D::new(Vec2::ONE, 1.0, 20.0));
        assert_eq!(scene.active_camera(), Some(first));

        scene.set_active_camera(Some(second)).unwrap();
        assert_eq!(scene.find_camera().map(|c| c.size), Some(20.0));

        scene.despawn(second).unwrap();
        assert_eq!(scene.active_camera(), None);
        assert_eq!(scene.find_camera().map(|c| c.size), Some(10.0));
    }

    #[test]
    fn only_cameras_can_be_active() {
        let mut scene = Scene::new();
        let plain = scene.spawn();
        assert_eq!(
            scene.set_active_camera(Some(plain)),
            Err(SceneError::NotACamera(plain))
        );
        scene.despawn(plain).unwrap();
        assert!(matches!(
            scene.set_active_camera(Some(plain)),
            Err(SceneError::Hierarchy(HierarchyError::StaleEntity(_)))
        ));
    }

    #[test]
    fn despawn_promotes_children_and_drops_components() {
        let mut scene = Scene::new();
        let parent = scene.spawn_sprite(sprite(1), Transform::from_xy(100.0, 0.0));
        let child = scene.spawn_sprite(sprite(2), Transform::from_xy(1.0, 0.0));
        scene.set_parent(child, Some(parent)).unwrap();

        scene.despawn(parent).unwrap();
        assert!(scene.drawable(parent).is_none());
        assert_eq!(textures(&scene), vec![2]);
        assert_eq!(scene.world_transform(child).position.x, 1.0);
        assert!(scene.despawn(parent).is_err());
    }

    #[test]
    fn inserts_on_despawned_entity_are_rejected() {
        let mut scene = Scene::new();
        let gone = scene.spawn();
        scene.despawn(gone).unwrap();

        let stale = |r: Result<bool, SceneError>| {
            matches!(r, Err(SceneError::Hierarchy(HierarchyError::StaleEntity(e))) if e == gone)
        };
        let camera = Camera2D::new(Vec2::ZERO, 1.0, 42.0);
        assert!(stale(scene.insert_camera(gone, camera).map(|old| old.is_some())));
        assert!(stale(scene.insert_transform(gone, Transform::default()).map(|old| old.is_some())));
        assert!(stale(scene.insert_drawable(gone, sprite(1)).map(|old| old.is_some())));

        assert_eq!(scene.active_camera(), None);
        assert!(scene.find_camera().is_none());
        assert!(scene.camera(gone).is_none());
        assert!(textures(&scene).is_empty());

        let live = scene.spawn();
        assert_eq!(scene.insert_camera(live, camera), Ok(None));
        assert_eq!(scene.active_camera(), Some(live));
    }
}
