//! Wavefront OBJ geometry: positions, texture coordinates, normals and
//! polygonal faces grouped by `o`/`g`/`usemtl`.

use crate::assets::LoadError;
use crate::objects::Point;
use crate::objects::triangle_mesh::TriangleMesh;
use nalgebra::Vector3;
use std::collections::HashMap;

#[derive(Debug)]
pub struct ObjGroup {
    pub name: String,
    pub material: Option<String>,
    pub mesh: TriangleMesh,
}

#[derive(Debug, Default)]
pub struct ObjModel {
    /// Material libraries named by `mtllib`, relative to the OBJ file.
    pub material_libraries: Vec<String>,
    pub groups: Vec<ObjGroup>,
}

/// (position, uv, normal) indices into the shared attribute lists.
type VertexKey = (usize, Option<usize>, Option<usize>);

#[derive(Default)]
struct GroupBuilder {
    name: String,
    material: Option<String>,
    index: HashMap<VertexKey, usize>,
    keys: Vec<VertexKey>,
    triangles: Vec<(usize, usize, usize)>,
}

impl GroupBuilder {
    fn new(name: String, material: Option<String>) -> Self {
        Self {
            name,
            material,
            ..Self::default()
        }
    }

    fn vertex(&mut self, key: VertexKey) -> usize {
        *self.index.entry(key).or_insert_with(|| {
            self.keys.push(key);
            self.keys.len() - 1
        })
    }

    fn finish(
        self,
        positions: &[Point],
        uvs: &[[f64; 2]],
        normals: &[Vector3<f64>],
    ) -> Option<ObjGroup> {
        if self.triangles.is_empty() {
            return None;
        }
        let vertices = self.keys.iter().map(|&(v, _, _)| positions[v]).collect();
        // Partial attributes are dropped rather than padded.
        let group_uvs = if self.keys.iter().all(|(_, vt, _)| vt.is_some()) {
            self.keys
                .iter()
                .filter_map(|&(_, vt, _)| vt.map(|i| uvs[i]))
                .collect()
        } else {
            Vec::new()
        };
        let group_normals = if self.keys.iter().all(|(_, _, vn)| vn.is_some()) {
            self.keys
                .iter()
                .filter_map(|&(_, _, vn)| vn.map(|i| normals[i]))
                .collect()
        } else {
            Vec::new()
        };
        Some(ObjGroup {
            name: self.name,
            material: self.material,
            mesh: TriangleMesh::new(vertices, group_normals, group_uvs, self.triangles),
        })
    }
}

struct Parser<'a> {
    path: &'a str,
    line: usize,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> LoadError {
        LoadError::Parse {
            path: self.path.to_string(),
            line: self.line,
            message: message.into(),
        }
    }

    fn floats<const N: usize>(&self, args: &[&str], keyword: &str) -> Result<[f64; N], LoadError> {
        let mut out = [0.0; N];
        if args.len() < N {
            return Err(self.error(format!("`{keyword}` needs {N} numbers")));
        }
        for (slot, raw) in out.iter_mut().zip(args) {
            *slot = raw
                .parse()
                .map_err(|_| self.error(format!("bad number `{raw}` in `{keyword}`")))?;
        }
        Ok(out)
    }

    /// Resolves a 1-based or negative (relative) OBJ index against `count` entries.
    fn index(&self, raw: &str, count: usize) -> Result<usize, LoadError> {
        let value: i64 = raw
            .parse()
            .map_err(|_| self.error(format!("bad index `{raw}`")))?;
        let resolved = match value {
            0 => None,
            v if v > 0 => Some(v as usize - 1),
            v => count.checked_sub(v.unsigned_abs() as usize),
        };
        resolved
            .filter(|&i| i < count)
            .ok_or_else(|| self.error(format!("index {value} out of range ({count} defined)")))
    }
}

pub fn parse_obj(source: &str, path: &str) -> Result<ObjModel, LoadError> {
    let mut parser = Parser { path, line: 0 };
    let mut positions: Vec<Point> = Vec::new();
    let mut uvs: Vec<[f64; 2]> = Vec::new();
    let mut normals: Vec<Vector3<f64>> = Vec::new();
    let mut model = ObjModel::default();
    let mut current = GroupBuilder::new("default".to_string(), None);

    for (number, line) in source.lines().enumerate() {
        parser.line = number + 1;
        let line = line.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();

        match keyword {
            "v" => {
                let [x, y, z] = parser.floats::<3>(&args, keyword)?;
                positions.push(Point::new(x, y, z));
            }
            "vt" => {
                // a missing v defaults to 0
                let u = parser.floats::<1>(&args, keyword)?[0];
                let v = match args.get(1) {
                    Some(_) => parser.floats::<2>(&args, keyword)?[1],
                    None => 0.0,
                };
                uvs.push([u, v]);
            }
            "vn" => {
                let [x, y, z] = parser.floats::<3>(&args, keyword)?;
                normals.push(
                    Vector3::new(x, y, z)
                        .try_normalize(f64::EPSILON)
                        .unwrap_or_else(Vector3::y),
                );
            }
            "f" => {
                if args.len() < 3 {
                    return Err(parser.error("face needs at least 3 vertices"));
                }
                let mut corners = Vec::with_capacity(args.len());
                for corner in &args {
                    let mut parts = corner.split('/');
                    let v = parser.index(parts.next().unwrap_or(""), positions.len())?;
                    let vt = match parts.next() {
                        Some("") | None => None,
                        Some(raw) => Some(parser.index(raw, uvs.len())?),
                    };
                    let vn = match parts.next() {
                        Some("") | None => None,
                        Some(raw) => Some(parser.index(raw, normals.len())?),
                    };
                    corners.push(current.vertex((v, vt, vn)));
                }
                // fan triangulation
                for i in 1..corners.len() - 1 {
                    current
                        .triangles
                        .push((corners[0], corners[i], corners[i + 1]));
                }
            }
            "o" | "g" => {
                let name = args.join(" ");
                let material = current.material.clone();
                let finished = std::mem::replace(&mut current, GroupBuilder::new(name, material));
                model
                    .groups
                    .extend(finished.finish(&positions, &uvs, &normals));
            }
            "usemtl" => {
                let material = args.join(" ");
                if current.triangles.is_empty() {
                    current.material = Some(material);
                } else {
                    let name = current.name.clone();
                    let finished = std::mem::replace(
                        &mut current,
                        GroupBuilder::new(name, Some(material)),
                    );
                    model
                        .groups
                        .extend(finished.finish(&positions, &uvs, &normals));
                }
            }
            "mtllib" => model
                .material_libraries
                .extend(args.iter().map(|name| name.to_string())),
            // smoothing groups, lines and points are not rendered
            _ => {}
        }
    }
    model
        .groups
        .extend(current.finish(&positions, &uvs, &normals));

    if model.groups.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_string(),
        });
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
mtllib fish.mtl
o fin
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl scales
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn parses_quad_as_two_triangles() {
        let model = parse_obj(QUAD, "quad.obj").unwrap();
        assert_eq!(model.material_libraries, vec!["fish.mtl"]);
        assert_eq!(model.groups.len(), 1);
        let group = &model.groups[0];
        assert_eq!(group.name, "fin");
        assert_eq!(group.material.as_deref(), Some("scales"));
        assert_eq!(group.mesh.triangles(), &[(0, 1, 2), (0, 2, 3)]);
        assert_eq!(group.mesh.uv(2), Some([1.0, 1.0]));
        assert!(group.mesh.has_normals());
    }

    #[test]
    fn mtllib_lists_every_library() {
        let source = "mtllib a.mtl b.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let model = parse_obj(source, "libs.obj").unwrap();
        assert_eq!(model.material_libraries, vec!["a.mtl", "b.mtl"]);
    }

    #[test]
    fn negative_indices_are_relative() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let model = parse_obj(source, "rel.obj").unwrap();
        assert_eq!(model.groups[0].mesh.vertices().len(), 3);
        assert!(!model.groups[0].mesh.has_uvs());
    }

    #[test]
    fn usemtl_splits_groups_and_shares_vertices_within_a_group() {
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
usemtl a
f 1 2 3
f 2 4 3
usemtl b
f 1 2 4
";
        let model = parse_obj(source, "split.obj").unwrap();
        assert_eq!(model.groups.len(), 2);
        assert_eq!(model.groups[0].material.as_deref(), Some("a"));
        assert_eq!(model.groups[0].mesh.vertices().len(), 4);
        assert_eq!(model.groups[1].material.as_deref(), Some("b"));
        assert_eq!(model.groups[1].mesh.vertices().len(), 3);
    }

    #[test]
    fn bad_index_reports_line() {
        let source = "v 0 0 0\nv 1 0 0\n\nf 1 2 9\n";
        let err = parse_obj(source, "bad.obj").unwrap_err();
        match err {
            LoadError::Parse { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn no_faces_is_empty() {
        let err = parse_obj("v 0 0 0\n", "points.obj").unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }
}
