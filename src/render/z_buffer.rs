use crate::config::BACKGROUND_COLOR;
use crate::objects::camera::Camera;
use crate::objects::light::LightRig;
use crate::objects::material::Material;
use crate::objects::triangle_mesh::TriangleMesh;
use crate::render::{Renderer, VertexLight, shade_vertex};
use crate::scene::context::SceneContext;
use image::RgbImage;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Vertices closer to the camera plane than this are not drawn.
const MIN_CLIP_W: f64 = 1e-6;

/// A vertex after projection: screen position with NDC depth, plus what
/// the rasterizer interpolates.
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    position: Point3<f64>,
    light: VertexLight,
    uv: Option<[f64; 2]>,
}

#[derive(Default)]
pub struct ZBufferPerformer {
    width: u32,
    height: u32,
    z_buffer: Vec<f64>,
}

impl ZBufferPerformer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            z_buffer: vec![f64::INFINITY; (width * height) as usize],
        }
    }

    fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.z_buffer
            .resize((width * height) as usize, f64::INFINITY);
        self.z_buffer.fill(f64::INFINITY);
    }

    fn set_depth(&mut self, x: u32, y: u32, depth: f64) {
        let index = (y * self.width + x) as usize;
        self.z_buffer[index] = depth;
    }

    fn get_depth(&self, x: u32, y: u32) -> f64 {
        let index = (y * self.width + x) as usize;
        self.z_buffer[index]
    }

    /// Maps NDC to pixel space, y pointing down.
    fn calculate_viewport_matrix(width: u32, height: u32) -> Matrix4<f64> {
        Matrix4::new(
            width as f64 / 2.,
            0.,
            0.,
            width as f64 / 2.,
            0.,
            -(height as f64 / 2.),
            0.,
            height as f64 / 2.,
            0.,
            0.,
            1.,
            0.,
            0.,
            0.,
            0.,
            1.,
        )
    }

    fn draw_triangle(
        &mut self,
        image: &mut RgbImage,
        material: &Material,
        tri: &[ScreenVertex; 3],
    ) {
        let [p1, p2, p3] = tri.map(|v| v.position);

        let min_x = (p1.x.min(p2.x).min(p3.x).floor().max(0.0) as u32).min(self.width - 1);
        let max_x = (p1.x.max(p2.x).max(p3.x).ceil().max(0.0) as u32).min(self.width - 1);
        let min_y = (p1.y.min(p2.y).min(p3.y).floor().max(0.0) as u32).min(self.height - 1);
        let max_y = (p1.y.max(p2.y).max(p3.y).ceil().max(0.0) as u32).min(self.height - 1);

        let denom = (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x);
        if denom == 0.0 {
            return;
        }
        let lights = tri.map(|v| v.light);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                // sample at the pixel center
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let u = ((p3.x - p2.x) * (py - p2.y) - (p3.y - p2.y) * (px - p2.x)) / denom;
                let v = ((p1.x - p3.x) * (py - p3.y) - (p1.y - p3.y) * (px - p3.x)) / denom;
                let bary = [u, v, 1.0 - u - v];

                if bary.iter().any(|&w| w < -f64::EPSILON) {
                    continue;
                }
                let z = p1.z * bary[0] + p2.z * bary[1] + p3.z * bary[2];
                if !(-1.0..=1.0).contains(&z) || z >= self.get_depth(x, y) {
                    continue;
                }
                self.set_depth(x, y, z);

                let uv = match (tri[0].uv, tri[1].uv, tri[2].uv) {
                    (Some(a), Some(b), Some(c)) => Some([
                        a[0] * bary[0] + b[0] * bary[1] + c[0] * bary[2],
                        a[1] * bary[0] + b[1] * bary[1] + c[1] * bary[2],
                    ]),
                    _ => None,
                };
                let weights = bary.map(|w| w as f32);
                let color = VertexLight::blend(&lights, weights).apply(material.albedo(uv));
                image.put_pixel(x, y, color.to_rgb8());
            }
        }
    }

    fn draw_mesh(
        &mut self,
        image: &mut RgbImage,
        mesh: &TriangleMesh,
        material: &Material,
        world: &Matrix4<f64>,
        camera: &Camera,
        lights: &LightRig,
    ) {
        let (width, height) = image.dimensions();
        let mvp_matrix = camera.camera_matrix() * world;
        let viewport_matrix = Self::calculate_viewport_matrix(width, height);
        let normal_matrix = world
            .fixed_view::<3, 3>(0, 0)
            .clone_owned()
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(Matrix3::identity);
        let shininess = material.shininess().filter(|_| material.is_lit());

        let screen_vertices: Vec<Option<ScreenVertex>> = mesh
            .vertices()
            .iter()
            .zip(mesh.normals())
            .enumerate()
            .map(|(i, (vertex, normal))| {
                let clip = mvp_matrix * vertex.to_homogeneous();
                if clip.w <= MIN_CLIP_W {
                    return None;
                }
                let ndc = Point3::from(clip.xyz() / clip.w);
                let world_point = world.transform_point(vertex);
                let world_normal = (normal_matrix * normal)
                    .try_normalize(f64::EPSILON)
                    .unwrap_or_else(Vector3::y);
                Some(ScreenVertex {
                    position: viewport_matrix.transform_point(&ndc),
                    light: shade_vertex(shininess, &world_normal, &world_point, &camera.pos, lights),
                    uv: mesh.uv(i),
                })
            })
            .collect();

        for tri in mesh.triangles() {
            if let (Some(a), Some(b), Some(c)) = (
                screen_vertices[tri.0],
                screen_vertices[tri.1],
                screen_vertices[tri.2],
            ) {
                self.draw_triangle(image, material, &[a, b, c]);
            }
        }
    }
}

impl Renderer for ZBufferPerformer {
    fn create_frame_mut(&mut self, image: &mut RgbImage, ctx: &SceneContext) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        self.reset(width, height);
        image.pixels_mut().for_each(|px| *px = BACKGROUND_COLOR);

        ctx.scene.for_each_mesh(|_, node, world| {
            let (Some(mesh), Some(material)) = (node.mesh.as_ref(), node.material.as_deref())
            else {
                return;
            };
            self.draw_mesh(image, mesh, material, world, &ctx.camera, &ctx.lights);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::objects::material::Color;
    use crate::objects::primitives::ShapeKind;
    use crate::scene::Node;
    use crate::scene::context::Spin;
    use image::Rgb;
    use std::sync::Arc;

    #[test]
    fn empty_scene_is_background() {
        let ctx = SceneContext::empty(&SceneConfig::default());
        let mut renderer = ZBufferPerformer::new(16, 16);
        let frame = renderer.create_frame(16, 16, &ctx);
        assert!(frame.pixels().all(|px| *px == BACKGROUND_COLOR));
    }

    #[test]
    fn shape_at_origin_covers_center_pixel() {
        let mut ctx = SceneContext::empty(&SceneConfig::default());
        ctx.add_shape(
            Node::mesh(
                "box",
                Arc::new(ShapeKind::Box.build()),
                Material::BasicColor {
                    color: Color::new(1.0, 0.0, 0.0),
                },
            ),
            Spin::Tumble { speed: 0.0 },
        );
        let mut renderer = ZBufferPerformer::default();
        let frame = renderer.create_frame(64, 64, &ctx);
        assert_eq!(*frame.get_pixel(32, 32), Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(0, 0), BACKGROUND_COLOR);
    }

    #[test]
    fn nearer_surface_wins_depth_test() {
        let mesh = Arc::new(ShapeKind::Box.build());
        let red = Material::BasicColor {
            color: Color::new(1.0, 0.0, 0.0),
        };
        let green = Material::BasicColor {
            color: Color::new(0.0, 1.0, 0.0),
        };
        // green sits halfway between the camera and the red box
        let far = (Vector3::zeros(), red);
        let near = (Vector3::new(0.0, 2.5, 5.0), green);

        for order in [[far.clone(), near.clone()], [near.clone(), far.clone()]] {
            let mut ctx = SceneContext::empty(&SceneConfig::default());
            for (position, material) in order {
                let mut node = Node::mesh("box", mesh.clone(), material);
                node.transform.position = position;
                ctx.add_shape(node, Spin::Tumble { speed: 0.0 });
            }
            let frame = ZBufferPerformer::default().create_frame(64, 64, &ctx);
            assert_eq!(*frame.get_pixel(32, 32), Rgb([0, 255, 0]));
        }
    }
}
