use crate::assets::LoadedModel;
use crate::config::{
    FAR_PLANE, FOV_DEGREES, ModelConfig, NEAR_PLANE, SceneConfig, TUMBLE_BASE_SPEED,
    TUMBLE_SPEED_STEP, TextureConfig,
};
use crate::objects::camera::Camera;
use crate::objects::light::LightRig;
use crate::objects::material::{Color, Material, Texture, TextureRef};
use crate::objects::orbit::OrbitControls;
use crate::objects::primitives::ShapeKind;
use crate::picking::registry::PickableRegistry;
use crate::scene::{Node, NodeId, Scene, Transform};
use itertools::iproduct;
use nalgebra::{Point3, Vector3};
use std::sync::Arc;
use std::time::Duration;

/// How an animated node's rotation follows the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spin {
    /// Same angle on X and Y.
    Tumble { speed: f64 },
    /// Around Y only.
    Turntable { speed: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animated {
    pub node: NodeId,
    pub spin: Spin,
}

/// Where a loaded model goes and how fast it turns.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPlacement {
    pub scale: f64,
    pub position: Vector3<f64>,
    pub yaw: f64,
    pub spin: f64,
}

impl From<&ModelConfig> for ModelPlacement {
    fn from(config: &ModelConfig) -> Self {
        Self {
            scale: config.scale,
            position: Vector3::from(config.position),
            yaw: config.yaw,
            spin: config.spin,
        }
    }
}

/// The two textures shared by the grid.
#[derive(Debug, Clone)]
pub struct ShapeTextures {
    pub gray: TextureRef,
    pub blue: TextureRef,
}

impl ShapeTextures {
    /// Missing files are replaced by flat colors.
    pub fn load(config: &TextureConfig) -> Self {
        Self {
            gray: Texture::load_or_solid(&config.gray, Color::new(0.5, 0.5, 0.5)),
            blue: Texture::load_or_solid(&config.blue, Color::new(0.2, 0.35, 0.8)),
        }
    }

    pub fn solid() -> Self {
        Self {
            gray: Arc::new(Texture::solid("gray", Color::new(0.5, 0.5, 0.5))),
            blue: Arc::new(Texture::solid("blue", Color::new(0.2, 0.35, 0.8))),
        }
    }
}

/// Everything the frame loop, the picker and the light controls share.
/// Owned by the app and passed down by reference.
#[derive(Debug)]
pub struct SceneContext {
    pub scene: Scene,
    pub registry: PickableRegistry,
    pub lights: LightRig,
    pub camera: Camera,
    pub orbit: OrbitControls,
    animated: Vec<Animated>,
    model: Option<NodeId>,
    viewport: (u32, u32),
}

impl SceneContext {
    /// Camera, lights and an empty scene.
    pub fn empty(config: &SceneConfig) -> Self {
        let viewport = (config.viewport.width.max(1), config.viewport.height.max(1));
        let target = Point3::from(config.camera.target);
        let camera = Camera::new(
            Point3::from(config.camera.position),
            target,
            Vector3::y(),
            FOV_DEGREES.to_radians(),
            viewport.0 as f64 / viewport.1 as f64,
            NEAR_PLANE,
            FAR_PLANE,
        );
        Self {
            scene: Scene::new(),
            registry: PickableRegistry::new(),
            lights: LightRig::standard(),
            camera,
            orbit: OrbitControls::new(target),
            animated: Vec::new(),
            model: None,
            viewport,
        }
    }

    /// The full shape grid under the standard light rig.
    pub fn new(config: &SceneConfig, textures: &ShapeTextures) -> Self {
        let mut ctx = Self::empty(config);
        ctx.populate_grid(config, textures);
        ctx
    }

    fn populate_grid(&mut self, config: &SceneConfig, textures: &ShapeTextures) {
        let meshes: Vec<_> = ShapeKind::ALL
            .iter()
            .map(|kind| (*kind, Arc::new(kind.build())))
            .collect();
        let axis = config.grid_axis();

        for (index, (&x, &z)) in iproduct!(axis.iter(), axis.iter()).enumerate() {
            let (kind, mesh) = &meshes[index % meshes.len()];
            let material = match index % 3 {
                0 => Material::phong_textured(textures.gray.clone()),
                1 => Material::phong_textured(textures.blue.clone()),
                _ => Material::phong(Color::from_hsl(index as f32 / 25.0, 0.5, 0.5)),
            };
            let node = Node::mesh(format!("{}-{index}", kind.name()), mesh.clone(), material)
                .with_transform(Transform::from_position(Vector3::new(x, 0.0, z)));
            let speed = TUMBLE_BASE_SPEED + index as f64 * TUMBLE_SPEED_STEP;
            self.add_shape(node, Spin::Tumble { speed });
        }
        log::info!("Created {} shapes", self.animated.len());
    }

    /// Adds a root node, makes it pickable and animates it.
    pub fn add_shape(&mut self, node: Node, spin: Spin) -> NodeId {
        let id = self.scene.add(node);
        self.registry.register(&self.scene, id);
        self.animated.push(Animated { node: id, spin });
        id
    }

    /// Attaches a finished model load: one root per model, one child per
    /// part, every part pickable, the root turning about Y.
    pub fn merge_loaded_model(&mut self, model: LoadedModel, placement: &ModelPlacement) -> NodeId {
        let transform = Transform {
            position: placement.position,
            rotation: Vector3::new(0.0, placement.yaw, 0.0),
            scale: Vector3::repeat(placement.scale),
        };
        let root = self
            .scene
            .add(Node::group(model.name.clone()).with_transform(transform));
        for part in model.parts {
            self.scene
                .add_child(root, Node::mesh(part.name, part.mesh, part.material));
        }

        let added = self.registry.register(&self.scene, root);
        self.model = Some(root);
        self.animated.push(Animated {
            node: root,
            spin: Spin::Turntable {
                speed: placement.spin,
            },
        });
        log::info!("Model loaded successfully: {} ({added} pickable parts)", model.name);
        root
    }

    /// Sets every animated node's rotation for the given time since start.
    pub fn animate(&mut self, elapsed: Duration) {
        let time = elapsed.as_secs_f64();
        for animated in &self.animated {
            let Some(node) = self.scene.node_mut(animated.node) else {
                continue;
            };
            match animated.spin {
                Spin::Tumble { speed } => {
                    node.transform.rotation.x = time * speed;
                    node.transform.rotation.y = time * speed;
                }
                Spin::Turntable { speed } => {
                    node.transform.rotation.y = time * speed;
                }
            }
        }
    }

    /// Updates the camera aspect ratio. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.viewport {
            return;
        }
        self.viewport = (width, height);
        self.camera.set_aspect_ratio(width as f64 / height as f64);
        log::debug!("Viewport resized to {width}x{height}");
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn model(&self) -> Option<NodeId> {
        self.model
    }

    pub fn animated(&self) -> &[Animated] {
        &self.animated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ModelPart;
    use crate::objects::material::MaterialTag;

    fn grid() -> SceneContext {
        SceneContext::new(&SceneConfig::default(), &ShapeTextures::solid())
    }

    fn fish() -> LoadedModel {
        let part = |name: &str| ModelPart {
            name: name.to_string(),
            mesh: Arc::new(ShapeKind::Sphere.build()),
            material: Material::phong(Color::WHITE),
        };
        LoadedModel {
            name: "fish".to_string(),
            parts: vec![part("body"), part("tail")],
        }
    }

    #[test]
    fn grid_matches_layout() {
        let ctx = grid();
        assert_eq!(ctx.registry.len(), 36);
        assert_eq!(ctx.animated().len(), 36);

        let first = ctx.scene.node(ctx.registry.snapshot()[0]).unwrap();
        assert_eq!(first.name, "box-0");
        assert_eq!(first.transform.position, Vector3::new(-5.0, 0.0, -5.0));
        assert_eq!(first.material.as_ref().unwrap().tag(), MaterialTag::Textured);

        let second = ctx.scene.node(ctx.registry.snapshot()[1]).unwrap();
        assert_eq!(second.name, "sphere-1");
        assert_eq!(second.transform.position, Vector3::new(-5.0, 0.0, -3.0));

        let third = ctx.scene.node(ctx.registry.snapshot()[2]).unwrap();
        let color = third.material.as_ref().unwrap().color().unwrap();
        let expected = Color::from_hsl(2.0 / 25.0, 0.5, 0.5);
        assert_eq!(color, expected);
    }

    #[test]
    fn merge_registers_every_part_and_spins_root() {
        let mut ctx = grid();
        let placement = ModelPlacement::from(&ModelConfig::default());
        let root = ctx.merge_loaded_model(fish(), &placement);

        assert_eq!(ctx.model(), Some(root));
        assert_eq!(ctx.registry.len(), 38);
        assert!(!ctx.registry.contains(root));
        for &child in ctx.scene.node(root).unwrap().children() {
            assert!(ctx.registry.contains(child));
        }
        assert_eq!(
            ctx.animated().last(),
            Some(&Animated {
                node: root,
                spin: Spin::Turntable { speed: 0.5 }
            })
        );

        let transform = &ctx.scene.node(root).unwrap().transform;
        assert_eq!(transform.scale, Vector3::repeat(50.0));
        assert_eq!(transform.position, Vector3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn animate_sets_rotation_from_elapsed_time() {
        let mut ctx = grid();
        let root = ctx.merge_loaded_model(fish(), &ModelPlacement::from(&ModelConfig::default()));
        ctx.animate(Duration::from_secs(2));

        let first = ctx.scene.node(ctx.registry.snapshot()[0]).unwrap();
        assert!((first.transform.rotation.x - 2.0).abs() < 1e-12);
        assert!((first.transform.rotation.y - 2.0).abs() < 1e-12);
        let tenth = ctx.scene.node(ctx.registry.snapshot()[10]).unwrap();
        assert!((tenth.transform.rotation.x - 4.0).abs() < 1e-12);

        let model = &ctx.scene.node(root).unwrap().transform;
        assert!((model.rotation.y - 1.0).abs() < 1e-12);
        assert_eq!(model.rotation.x, 0.0);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut ctx = SceneContext::empty(&SceneConfig::default());
        ctx.resize(1200, 600);
        let aspect = ctx.camera.aspect_ratio();
        ctx.resize(1200, 600);
        assert_eq!(ctx.camera.aspect_ratio(), aspect);
        assert_eq!(aspect, 2.0);

        ctx.resize(0, 600);
        assert_eq!(ctx.viewport(), (1200, 600));
    }
}
