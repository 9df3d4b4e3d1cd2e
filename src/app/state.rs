use crate::assets::{LoadError, LoadEvent, LoadStage, LoadTask, ModelRequest};
use crate::config::{BACKGROUND_COLOR, SceneConfig};
use crate::controls::{ControlError, ControlPanel, LightRigController};
use crate::picking::mutator::MaterialMutator;
use crate::render::Renderer;
use crate::render::z_buffer::ZBufferPerformer;
use crate::scene::context::{ModelPlacement, SceneContext, ShapeTextures};
use crate::scheduler::{FrameScheduler, FrameTicket, SchedulerError, TickReport};
use eframe::egui::{self, Context, TextureHandle};
use image::RgbImage;
use rfd::FileDialog;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

pub struct ShapeGardenApp {
    pub texture: Option<TextureHandle>,
    pub frame: RgbImage,
    pub context: SceneContext,
    pub renderer: Box<dyn Renderer>,

    pub scheduler: FrameScheduler,
    pub ticket: Option<FrameTicket>,
    pub last_report: Option<TickReport>,

    pub mutator: MaterialMutator,
    pub controls: ControlPanel,
    pub controller: LightRigController,

    pub loads: Vec<LoadTask>,
    pub load_progress: Option<(LoadStage, f32)>,
    pub placement: ModelPlacement,
    pub status: String,

    pub error_message: Option<String>,
    pub viewport_has_pointer: bool,
}

impl ShapeGardenApp {
    /// Builds the grid, binds the light controls and starts the frame loop.
    /// The configured model, if any, starts loading in the background.
    pub fn new(config: &SceneConfig) -> Result<Self, AppError> {
        let textures = ShapeTextures::load(&config.textures);
        let context = SceneContext::new(config, &textures);

        let mut controls = ControlPanel::with_all_controls();
        let controller = LightRigController::bind(&context.lights, &mut controls)?;

        let mut scheduler = FrameScheduler::new();
        let ticket = scheduler.start()?;

        let mutator = match config.seed {
            Some(seed) => {
                log::info!("Recolor seed: {seed}");
                MaterialMutator::from_seed(seed)
            }
            None => MaterialMutator::from_entropy(),
        };

        let (width, height) = context.viewport();
        let mut app = Self {
            texture: None,
            frame: RgbImage::from_pixel(width, height, BACKGROUND_COLOR),
            context,
            renderer: Box::new(ZBufferPerformer::new(width, height)),
            scheduler,
            ticket: Some(ticket),
            last_report: None,
            mutator,
            controls,
            controller,
            loads: Vec::new(),
            load_progress: None,
            placement: ModelPlacement::from(&config.model),
            status: String::new(),
            error_message: None,
            viewport_has_pointer: false,
        };

        if config.model.enabled {
            app.start_load(ModelRequest::new(&config.model.obj, config.model.mtl.clone()));
        }
        Ok(app)
    }

    pub fn start_load(&mut self, request: ModelRequest) {
        match LoadTask::spawn(request) {
            Ok(task) => {
                self.status = format!("Loading {}", task.request().obj_path.display());
                self.load_progress = None;
                self.loads.push(task);
            }
            Err(e) => self.report_load_error(e),
        }
    }

    pub fn open_file_dialog(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("OBJ files", &["obj"])
            .set_directory("./models")
            .pick_file()
        {
            self.start_load(ModelRequest::new(path, None));
        }
    }

    /// Drains every running load. Finished models go into the scene.
    pub fn poll_loads(&mut self) {
        let mut finished = Vec::new();
        for task in &mut self.loads {
            for event in task.poll() {
                match event {
                    LoadEvent::Progress { stage, fraction } => {
                        log::debug!("{stage:?} {:.0}% loaded", fraction * 100.0);
                        self.load_progress = Some((stage, fraction));
                    }
                    LoadEvent::Loaded(model) => finished.push(Ok(model)),
                    LoadEvent::Failed(e) => finished.push(Err(e)),
                }
            }
        }
        self.loads.retain(|task| !task.is_finished());
        if self.loads.is_empty() {
            self.load_progress = None;
        }

        for result in finished {
            match result {
                Ok(model) => {
                    let name = model.name.clone();
                    self.context.merge_loaded_model(model, &self.placement);
                    self.status = format!("Loaded {name}");
                }
                Err(e) => self.report_load_error(e),
            }
        }
    }

    fn report_load_error(&mut self, e: LoadError) {
        log::error!("Error loading model: {e}");
        self.status = "Model failed to load".to_string();
        self.error_message = Some(format!("Error loading model: {e}"));
    }

    /// Runs one scheduler tick and uploads the frame.
    pub fn update_frame(&mut self, ctx: &Context) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        let renderer = &mut self.renderer;
        let frame = &mut self.frame;
        let result = self
            .scheduler
            .tick(ticket, Instant::now(), &mut self.context, |scene| {
                renderer.create_frame_mut(frame, scene)
            });

        match result {
            Ok((next, report)) => {
                self.ticket = Some(next);
                self.last_report = Some(report);
            }
            Err(e) => {
                log::error!("Frame loop stopped: {e}");
                self.error_message = Some(format!("Frame loop stopped: {e}"));
                return;
            }
        }

        let egui_image = egui::ColorImage::from_rgb(
            [self.frame.width() as usize, self.frame.height() as usize],
            self.frame.as_raw(),
        );
        match self.texture.as_mut() {
            Some(texture) => texture.set(egui_image, Default::default()),
            None => {
                self.texture =
                    Some(ctx.load_texture("rendered_image", egui_image, Default::default()));
            }
        }
    }

    pub fn update_viewport_size(&mut self, width: u32, height: u32) {
        if (width, height) == self.frame.dimensions() {
            return;
        }
        self.frame = RgbImage::from_pixel(width, height, BACKGROUND_COLOR);
        self.context.resize(width, height);
    }

    pub fn fps(&self) -> f64 {
        self.last_report.map(|report| report.fps).unwrap_or(0.0)
    }
}

impl eframe::App for ShapeGardenApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_loads();
        self.mouse_wheel_zoom(ctx);
        self.render_ui(ctx);
        self.update_frame(ctx);
        ctx.request_repaint();
    }
}
