use crate::objects::material::{Color, DEFAULT_SHININESS, Material, MaterialTag};
use crate::scene::{NodeId, Scene};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What the mutator does with a material of a given variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStrategy {
    /// Overwrite the color field, keep the material instance.
    RecolorInPlace,
    /// Drop the texture and bind a fresh lit material with the old shininess.
    ReplaceWithUntextured,
    /// Drop the texture and bind a fresh unlit flat-colored material.
    ReplaceWithBasicColor,
    /// Recolor if the material exposes a color at all, else leave it alone.
    RecolorIfColorField,
}

impl MutationStrategy {
    pub fn for_tag(tag: MaterialTag) -> Self {
        match tag {
            MaterialTag::Untextured => MutationStrategy::RecolorInPlace,
            MaterialTag::Textured => MutationStrategy::ReplaceWithUntextured,
            MaterialTag::BasicColor => MutationStrategy::RecolorInPlace,
            MaterialTag::BasicTextured => MutationStrategy::ReplaceWithBasicColor,
            MaterialTag::Other => MutationStrategy::RecolorIfColorField,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MutationOutcome {
    RecoloredInPlace(Color),
    Replaced(Color),
    Unchanged,
}

/// Recolors picked nodes with uniformly random RGB colors.
#[derive(Debug)]
pub struct MaterialMutator<R: Rng = StdRng> {
    rng: R,
}

impl MaterialMutator<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> MaterialMutator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Three independent samples in `[0, 1)`, drawn red, green, blue.
    pub fn random_color(&mut self) -> Color {
        let r = self.rng.r#gen::<f32>();
        let g = self.rng.r#gen::<f32>();
        let b = self.rng.r#gen::<f32>();
        Color::new(r, g, b)
    }

    /// Applies the strategy for the node's material. A color is drawn on
    /// every call, so the random sequence does not depend on what was hit.
    pub fn mutate(&mut self, scene: &mut Scene, node: NodeId) -> MutationOutcome {
        let color = self.random_color();
        let Some(slot) = scene.node_mut(node).map(|node| &mut node.material) else {
            return MutationOutcome::Unchanged;
        };
        let Some(material) = slot.as_mut() else {
            return MutationOutcome::Unchanged;
        };

        match MutationStrategy::for_tag(material.tag()) {
            MutationStrategy::RecolorInPlace | MutationStrategy::RecolorIfColorField => {
                match material.color_mut() {
                    Some(field) => {
                        *field = color;
                        MutationOutcome::RecoloredInPlace(color)
                    }
                    None => MutationOutcome::Unchanged,
                }
            }
            MutationStrategy::ReplaceWithUntextured => {
                let shininess = material.shininess().unwrap_or(DEFAULT_SHININESS);
                *slot = Some(Box::new(Material::Untextured { color, shininess }));
                MutationOutcome::Replaced(color)
            }
            MutationStrategy::ReplaceWithBasicColor => {
                *slot = Some(Box::new(Material::BasicColor { color }));
                MutationOutcome::Replaced(color)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::material::{Texture, TextureRef};
    use crate::objects::primitives::ShapeKind;
    use crate::scene::Node;
    use std::sync::Arc;

    fn texture() -> TextureRef {
        Arc::new(Texture::solid("gray", Color::new(0.5, 0.5, 0.5)))
    }

    fn scene_with(material: Option<Material>) -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let mut node = Node::group("shape");
        node.mesh = Some(Arc::new(ShapeKind::Box.build()));
        node.material = material.map(Box::new);
        let id = scene.add(node);
        (scene, id)
    }

    fn material_ptr(scene: &Scene, id: NodeId) -> *const Material {
        let boxed = scene.node(id).unwrap().material.as_ref().unwrap();
        &**boxed as *const Material
    }

    #[test]
    fn strategy_table_is_total() {
        let expected = [
            MutationStrategy::RecolorInPlace,
            MutationStrategy::ReplaceWithUntextured,
            MutationStrategy::RecolorInPlace,
            MutationStrategy::ReplaceWithBasicColor,
            MutationStrategy::RecolorIfColorField,
        ];
        for (tag, strategy) in MaterialTag::ALL.into_iter().zip(expected) {
            assert_eq!(MutationStrategy::for_tag(tag), strategy, "{tag:?}");
        }
        // every textured variant is replaced, never recolored in place
        for tag in MaterialTag::ALL.into_iter().filter(|tag| tag.has_texture()) {
            assert_ne!(MutationStrategy::for_tag(tag), MutationStrategy::RecolorInPlace);
        }
    }

    #[test]
    fn untextured_keeps_identity_and_shininess() {
        let (mut scene, id) = scene_with(Some(Material::Untextured {
            color: Color::WHITE,
            shininess: 12.0,
        }));
        let before = material_ptr(&scene, id);

        let mut mutator = MaterialMutator::from_seed(7);
        let outcome = mutator.mutate(&mut scene, id);

        assert!(std::ptr::eq(before, material_ptr(&scene, id)));
        let material = scene.node(id).unwrap().material.as_deref().unwrap();
        let MutationOutcome::RecoloredInPlace(color) = outcome else {
            panic!("expected in-place recolor, got {outcome:?}");
        };
        assert_eq!(material.color(), Some(color));
        assert_eq!(material.shininess(), Some(12.0));
    }

    #[test]
    fn textured_is_replaced_by_untextured() {
        let (mut scene, id) = scene_with(Some(Material::Textured {
            texture: texture(),
            shininess: 42.0,
        }));
        let before = material_ptr(&scene, id);

        let mut mutator = MaterialMutator::from_seed(7);
        let outcome = mutator.mutate(&mut scene, id);

        assert!(!std::ptr::eq(before, material_ptr(&scene, id)));
        let material = scene.node(id).unwrap().material.as_deref().unwrap();
        assert_eq!(material.tag(), MaterialTag::Untextured);
        assert!(material.texture().is_none());
        assert_eq!(material.shininess(), Some(42.0));
        let color = material.color().unwrap();
        assert!(color.is_unit());
        assert_eq!(outcome, MutationOutcome::Replaced(color));
    }

    #[test]
    fn basic_textured_becomes_basic_color() {
        let (mut scene, id) = scene_with(Some(Material::BasicTextured { texture: texture() }));
        let mut mutator = MaterialMutator::from_seed(1);
        mutator.mutate(&mut scene, id);
        let material = scene.node(id).unwrap().material.as_deref().unwrap();
        assert_eq!(material.tag(), MaterialTag::BasicColor);
        assert!(material.texture().is_none());
    }

    #[test]
    fn basic_color_recolors_in_place() {
        let (mut scene, id) = scene_with(Some(Material::BasicColor {
            color: Color::BLACK,
        }));
        let before = material_ptr(&scene, id);
        let mut mutator = MaterialMutator::from_seed(3);
        let outcome = mutator.mutate(&mut scene, id);
        assert!(std::ptr::eq(before, material_ptr(&scene, id)));
        assert!(matches!(outcome, MutationOutcome::RecoloredInPlace(_)));
    }

    #[test]
    fn other_without_color_and_missing_material_are_no_ops() {
        let mut mutator = MaterialMutator::from_seed(5);

        let (mut scene, id) = scene_with(Some(Material::Other { color: None }));
        assert_eq!(mutator.mutate(&mut scene, id), MutationOutcome::Unchanged);

        let (mut scene, id) = scene_with(None);
        assert_eq!(mutator.mutate(&mut scene, id), MutationOutcome::Unchanged);
        assert!(scene.node(id).unwrap().material.is_none());
    }

    #[test]
    fn other_with_color_is_recolored() {
        let (mut scene, id) = scene_with(Some(Material::Other {
            color: Some(Color::BLACK),
        }));
        let mut mutator = MaterialMutator::from_seed(5);
        let outcome = mutator.mutate(&mut scene, id);
        let MutationOutcome::RecoloredInPlace(color) = outcome else {
            panic!("expected in-place recolor, got {outcome:?}");
        };
        assert_eq!(
            scene.node(id).unwrap().material.as_deref().unwrap().color(),
            Some(color)
        );
    }

    #[test]
    fn seeded_colors_are_reproducible() {
        let mut a = MaterialMutator::from_seed(42);
        let mut b = MaterialMutator::new(StdRng::seed_from_u64(42));
        for _ in 0..4 {
            assert_eq!(a.random_color(), b.random_color());
        }
    }
}
