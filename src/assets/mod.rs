//! Model loading off the UI thread.
//!
//! A [`LoadTask`] runs [`load_model`] on a worker thread and reports back
//! through a channel that the UI drains once per frame with [`LoadTask::poll`].
//! Everything that touches the scene happens on the UI side, in
//! [`SceneContext::merge_loaded_model`](crate::scene::context::SceneContext::merge_loaded_model).

pub mod mtl;
pub mod obj;

use crate::assets::mtl::{MtlLibrary, parse_mtl};
use crate::assets::obj::parse_obj;
use crate::objects::material::{Color, Material, Texture, TextureRef};
use crate::objects::triangle_mesh::TriangleMesh;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use thiserror::Error;

const READ_CHUNK: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },
    #[error("failed to decode texture {path}: {source}")]
    Texture {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} contains no faces")]
    Empty { path: String },
    #[error("failed to start loader thread: {0}")]
    Spawn(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Materials,
    Geometry,
}

#[derive(Debug)]
pub enum LoadEvent {
    Progress { stage: LoadStage, fraction: f32 },
    Loaded(LoadedModel),
    Failed(LoadError),
}

#[derive(Debug, Clone)]
pub struct ModelPart {
    pub name: String,
    pub mesh: Arc<TriangleMesh>,
    pub material: Material,
}

/// A fully decoded model, not yet attached to any scene.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub parts: Vec<ModelPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub obj_path: PathBuf,
    /// When absent the OBJ's own `mtllib` is used, if any.
    pub mtl_path: Option<PathBuf>,
}

impl ModelRequest {
    pub fn new(obj_path: impl Into<PathBuf>, mtl_path: Option<PathBuf>) -> Self {
        Self {
            obj_path: obj_path.into(),
            mtl_path,
        }
    }
}

/// Reads `path` in chunks, reporting the fraction read after each one.
pub fn read_with_progress(
    path: &Path,
    mut progress: impl FnMut(f32),
) -> Result<String, LoadError> {
    let read_error = |source| LoadError::Read {
        path: path.display().to_string(),
        source,
    };
    let mut file = File::open(path).map_err(read_error)?;
    let total = file.metadata().map(|m| m.len()).unwrap_or(0);

    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut chunk).map_err(read_error)?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        if total > 0 {
            progress((bytes.len() as f64 / total as f64).min(1.0) as f32);
        }
    }
    progress(1.0);

    String::from_utf8(bytes).map_err(|e| {
        read_error(io::Error::new(io::ErrorKind::InvalidData, e.utf8_error()))
    })
}

fn load_library(
    path: &Path,
    progress: &mut impl FnMut(LoadStage, f32),
) -> Result<MtlLibrary, LoadError> {
    let source = read_with_progress(path, |f| progress(LoadStage::Materials, f))?;
    parse_mtl(&source, path)
}

/// Loads an OBJ and its materials. Runs synchronously; see [`LoadTask`] for
/// the background version.
pub fn load_model(
    request: &ModelRequest,
    mut progress: impl FnMut(LoadStage, f32),
) -> Result<LoadedModel, LoadError> {
    let explicit_library = match &request.mtl_path {
        Some(path) => Some(load_library(path, &mut progress)?),
        None => None,
    };

    let obj_path = &request.obj_path;
    let source = read_with_progress(obj_path, |f| progress(LoadStage::Geometry, f))?;
    let obj = parse_obj(&source, &obj_path.display().to_string())?;

    let library = match explicit_library {
        Some(library) => library,
        None => {
            let base = obj_path.parent().unwrap_or(Path::new(""));
            let mut library = MtlLibrary::new();
            for name in &obj.material_libraries {
                match load_library(&base.join(name), &mut progress) {
                    Ok(found) => library.extend(found),
                    Err(e) => log::warn!("Error loading materials: {e}"),
                }
            }
            library
        }
    };

    let mut textures: HashMap<PathBuf, Option<TextureRef>> = HashMap::new();
    let parts = obj
        .groups
        .into_iter()
        .map(|group| {
            let material = group
                .material
                .as_ref()
                .and_then(|name| library.get(name))
                .map(|entry| {
                    let texture = entry.diffuse_map.as_ref().and_then(|path| {
                        textures
                            .entry(path.clone())
                            .or_insert_with(|| match Texture::load(path) {
                                Ok(texture) => Some(Arc::new(texture)),
                                Err(e) => {
                                    log::error!("Error loading texture: {e}");
                                    None
                                }
                            })
                            .clone()
                    });
                    match texture {
                        Some(texture) => Material::Textured {
                            texture,
                            shininess: entry.shininess,
                        },
                        None => Material::Untextured {
                            color: entry.diffuse,
                            shininess: entry.shininess,
                        },
                    }
                })
                .unwrap_or_else(|| Material::phong(Color::WHITE));
            ModelPart {
                name: group.name,
                mesh: Arc::new(group.mesh),
                material,
            }
        })
        .collect();

    let name = obj_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "model".to_string());
    Ok(LoadedModel { name, parts })
}

/// A model load running on a worker thread.
pub struct LoadTask {
    request: ModelRequest,
    receiver: Receiver<LoadEvent>,
    finished: bool,
}

impl LoadTask {
    pub fn spawn(request: ModelRequest) -> Result<Self, LoadError> {
        let (sender, receiver) = mpsc::channel();
        let worker_request = request.clone();
        thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                let progress_sender = sender.clone();
                let result = load_model(&worker_request, |stage, fraction| {
                    // the UI may already have dropped the task
                    let _ = progress_sender.send(LoadEvent::Progress { stage, fraction });
                });
                let event = match result {
                    Ok(model) => LoadEvent::Loaded(model),
                    Err(e) => LoadEvent::Failed(e),
                };
                let _ = sender.send(event);
            })
            .map_err(LoadError::Spawn)?;
        log::debug!("Loading {}", request.obj_path.display());
        Ok(Self {
            request,
            receiver,
            finished: false,
        })
    }

    pub fn request(&self) -> &ModelRequest {
        &self.request
    }

    /// Drains every event sent so far without blocking.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while !self.finished {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if matches!(event, LoadEvent::Loaded(_) | LoadEvent::Failed(_)) {
                        self.finished = true;
                    }
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.finished = true,
            }
        }
        events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::material::MaterialTag;
    use std::fs;
    use std::time::{Duration, Instant};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shape-garden-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_fish(dir: &Path) -> PathBuf {
        fs::write(
            dir.join("fish.mtl"),
            "newmtl body\nKd 1 0.5 0\nNs 10\nnewmtl skin\nmap_Kd missing.png\n",
        )
        .unwrap();
        let obj = dir.join("fish.obj");
        fs::write(
            &obj,
            "mtllib fish.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl body\nf 1 2 3\nusemtl skin\nf 3 2 1\n",
        )
        .unwrap();
        obj
    }

    #[test]
    fn loads_model_with_discovered_materials() {
        let dir = scratch_dir("sync");
        let obj = write_fish(&dir);

        let mut stages = Vec::new();
        let model = load_model(&ModelRequest::new(obj, None), |stage, fraction| {
            stages.push((stage, fraction))
        })
        .unwrap();

        assert_eq!(model.name, "fish");
        assert_eq!(model.parts.len(), 2);
        assert_eq!(model.parts[0].material.tag(), MaterialTag::Untextured);
        assert_eq!(model.parts[0].material.shininess(), Some(10.0));
        // unreadable map falls back to the flat diffuse color
        assert_eq!(model.parts[1].material.tag(), MaterialTag::Untextured);
        assert!(stages.contains(&(LoadStage::Geometry, 1.0)));
        assert!(stages.contains(&(LoadStage::Materials, 1.0)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let request = ModelRequest::new("does/not/exist.obj", None);
        let err = load_model(&request, |_, _| {}).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn background_task_reports_completion() {
        let dir = scratch_dir("task");
        let obj = write_fish(&dir);
        let mut task = LoadTask::spawn(ModelRequest::new(obj, None)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while !task.is_finished() && Instant::now() < deadline {
            events.extend(task.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(events.last(), Some(LoadEvent::Loaded(_))));
        assert!(
            events
                .iter()
                .any(|event| matches!(event, LoadEvent::Progress { .. }))
        );
    }
}
