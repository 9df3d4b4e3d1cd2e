use crate::assets::LoadError;
use crate::objects::material::{Color, DEFAULT_SHININESS};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The subset of an MTL entry the renderer uses.
#[derive(Debug, Clone, PartialEq)]
pub struct MtlMaterial {
    pub diffuse: Color,
    pub shininess: f32,
    /// Resolved against the MTL file's directory.
    pub diffuse_map: Option<PathBuf>,
}

impl Default for MtlMaterial {
    fn default() -> Self {
        Self {
            diffuse: Color::WHITE,
            shininess: DEFAULT_SHININESS,
            diffuse_map: None,
        }
    }
}

pub type MtlLibrary = HashMap<String, MtlMaterial>;

pub fn parse_mtl(source: &str, path: &Path) -> Result<MtlLibrary, LoadError> {
    let base = path.parent().unwrap_or(Path::new(""));
    let label = path.display().to_string();
    let mut library = MtlLibrary::new();
    let mut current: Option<(String, MtlMaterial)> = None;

    for (number, line) in source.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();
        let parse_error = |message: String| LoadError::Parse {
            path: label.clone(),
            line: number + 1,
            message,
        };

        if keyword == "newmtl" {
            library.extend(current.take());
            current = Some((args.join(" "), MtlMaterial::default()));
            continue;
        }
        let Some((_, material)) = current.as_mut() else {
            // statements before the first newmtl have nothing to attach to
            continue;
        };

        match keyword {
            "Kd" => {
                let values = args
                    .iter()
                    .take(3)
                    .map(|raw| raw.parse::<f32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| parse_error(format!("bad Kd: {e}")))?;
                let [r, g, b] = values[..] else {
                    return Err(parse_error("Kd needs 3 numbers".to_string()));
                };
                material.diffuse = Color::new(r, g, b);
            }
            "Ns" => {
                let raw = args.first().copied().unwrap_or("");
                material.shininess = raw
                    .parse()
                    .map_err(|_| parse_error(format!("bad Ns `{raw}`")))?;
            }
            "map_Kd" => {
                // options such as `-s 1 1 1` come before the file name
                let Some(file) = args.last() else {
                    return Err(parse_error("map_Kd needs a file name".to_string()));
                };
                material.diffuse_map = Some(base.join(file));
            }
            _ => {}
        }
    }
    library.extend(current);
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colors_shininess_and_maps() {
        let source = "\
# exported
newmtl body
Ns 96.0
Kd 0.8 0.4 0.1
map_Kd textures/fish.png

newmtl eye
Kd 0 0 0
";
        let library = parse_mtl(source, Path::new("obj/Goldfish_01.mtl")).unwrap();
        assert_eq!(library.len(), 2);

        let body = &library["body"];
        assert_eq!(body.shininess, 96.0);
        assert_eq!(body.diffuse, Color::new(0.8, 0.4, 0.1));
        assert_eq!(
            body.diffuse_map.as_deref(),
            Some(Path::new("obj/textures/fish.png"))
        );

        let eye = &library["eye"];
        assert_eq!(eye.diffuse, Color::BLACK);
        assert_eq!(eye.shininess, DEFAULT_SHININESS);
        assert!(eye.diffuse_map.is_none());
    }

    #[test]
    fn short_kd_is_an_error() {
        let err = parse_mtl("newmtl a\nKd 1 1\n", Path::new("a.mtl")).unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }
}
