use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use cavern::{
    CaveConfig, CaveGenerator, Grid, Mesh, MeshSink, NavigationBaker, PlacedMesh, SeedMode,
    Surface, triangulate_surface, utils::to_cave_image,
};
use eframe::{App, Frame, NativeOptions, egui, run_native};
use egui::{Color32, ColorImage, Pos2, Rect, TextureHandle};
use storage::CaveStore;
use storage::models::CaveDoc;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

const MONGO_URI: &str = "mongodb://localhost:27017";
const DB_NAME: &str = "cave_db";
const COLLECTION: &str = "caves";

// Keeps the last uploaded soil surface for the preview panel
#[derive(Default)]
struct PreviewSink {
    soil: Rc<RefCell<Option<Mesh>>>,
}

impl MeshSink for PreviewSink {
    fn upload(&mut self, surface: Surface, mesh: &PlacedMesh) {
        if surface == Surface::Soil {
            *self.soil.borrow_mut() = Some(mesh.mesh.clone());
        }
    }
}

// The viewer has no navigation system; just record what would be baked
struct LoggingBaker;

impl NavigationBaker for LoggingBaker {
    fn bake(&mut self, grid: &Grid, bounds: glam::Vec3) {
        info!(
            width = grid.width(),
            height = grid.height(),
            ?bounds,
            "navigation bake requested"
        );
    }
}

struct CaveApp {
    // parameters
    width: usize,
    height: usize,
    fill_percent: u32,
    steps: usize,
    corridor_width: u32,
    growth_percent: f32,
    seed: u64,
    random_seed: bool,
    name: String,

    generator: Option<CaveGenerator>,
    preview: Rc<RefCell<Option<Mesh>>>,

    cave_texture: Option<TextureHandle>,
    last_grid: Option<Grid>,
    last_seed: u64,

    // timing & status
    last_duration: Option<f32>,
    status_message: String,
}

impl Default for CaveApp {
    fn default() -> Self {
        let config = CaveConfig::default();
        Self {
            width: config.width,
            height: config.height,
            fill_percent: config.fill_percent,
            steps: config.simulation_steps,
            corridor_width: config.corridor_width,
            growth_percent: config.growth_percent,
            seed: 2025,
            random_seed: false,
            name: "cave".into(),
            generator: None,
            preview: Rc::new(RefCell::new(None)),
            cave_texture: None,
            last_grid: None,
            last_seed: 0,
            last_duration: None,
            status_message: String::new(),
        }
    }
}

impl CaveApp {
    fn config(&self) -> CaveConfig {
        CaveConfig {
            width: self.width,
            height: self.height,
            fill_percent: self.fill_percent,
            simulation_steps: self.steps,
            corridor_width: self.corridor_width,
            growth_percent: self.growth_percent,
            seed: self.seed,
            use_random_seed: self.random_seed,
            ..CaveConfig::default()
        }
    }

    // Reuse the generator while parameters are unchanged so growth accumulates
    fn generator(&mut self) -> Result<&mut CaveGenerator, String> {
        let config = self.config();
        let stale = self
            .generator
            .as_ref()
            .is_none_or(|g| g.config() != &config);
        if stale {
            let mut generator = CaveGenerator::new(config).map_err(|e| e.to_string())?;
            generator.set_mesh_sink(Box::new(PreviewSink {
                soil: self.preview.clone(),
            }));
            generator.set_navigation(Box::new(LoggingBaker));
            self.generator = Some(generator);
        }
        self.generator
            .as_mut()
            .ok_or_else(|| "generator unavailable".to_string())
    }

    fn show_grid(&mut self, ctx: &egui::Context, grid: Grid, seed: u64) {
        let img = to_cave_image(&grid);
        let color_image = ColorImage::from_rgb([grid.width(), grid.height()], &img);
        self.cave_texture =
            Some(ctx.load_texture("cave", color_image, egui::TextureOptions::NEAREST));
        self.last_grid = Some(grid);
        self.last_seed = seed;
        ctx.request_repaint();
    }

    fn generate(&mut self, ctx: &egui::Context) {
        let start = Instant::now();
        let mode = if self.random_seed {
            SeedMode::Random
        } else {
            SeedMode::Fixed(self.seed)
        };
        let result = self
            .generator()
            .and_then(|g| g.generate_cave(mode).map_err(|e| e.to_string()))
            .map(|generation| {
                (
                    generation.grid.clone(),
                    generation.seed,
                    generation.rooms,
                    generation.connect.corridors + generation.connect.stitches,
                )
            });
        match result {
            Ok((grid, seed, rooms, corridors)) => {
                let size = (grid.width(), grid.height());
                self.show_grid(ctx, grid, seed);
                self.last_duration = Some(start.elapsed().as_secs_f32() * 1000.0);
                self.status_message = format!(
                    "{}x{} cave in {:.2} ms (seed {}, {} rooms, {} corridors)",
                    size.0,
                    size.1,
                    self.last_duration.unwrap_or_default(),
                    seed,
                    rooms,
                    corridors
                );
            }
            Err(e) => {
                error!(%e, "generation failed");
                self.status_message = format!("Generation failed: {}", e);
            }
        }
    }

    fn save_png(&mut self) {
        let Some(grid) = &self.last_grid else {
            self.status_message = "Nothing to save yet".into();
            return;
        };
        let picked = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(format!("cave_{}.png", self.last_seed))
            .save_file();
        if let Some(path) = picked {
            self.status_message = match cavern::utils::save_png(grid, &path) {
                Ok(()) => format!("Saved {}", path.display()),
                Err(e) => format!("PNG error: {}", e),
            };
        }
    }

    fn save_to_db(&mut self) {
        let doc = match self.generator.as_ref() {
            Some(g) => g
                .generation()
                .map(|generation| CaveDoc::from_generation(&self.name, generation, g.config())),
            None => None,
        };
        let Some(doc) = doc else {
            self.status_message = "Generate a cave first".into();
            return;
        };

        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                self.status_message = format!("Runtime error: {}", e);
                return;
            }
        };
        self.status_message = match rt.block_on(CaveStore::init(MONGO_URI, DB_NAME, COLLECTION))
        {
            Ok(storage) => match rt.block_on(storage.create(doc)) {
                Ok(()) => "Saved to MongoDB".into(),
                Err(e) => format!("DB error: {}", e),
            },
            Err(e) => format!("DB init error: {}", e),
        };
    }

    fn load_from_db(&mut self, ctx: &egui::Context) {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                self.status_message = format!("Runtime error: {}", e);
                return;
            }
        };
        let found = rt.block_on(async {
            let storage = CaveStore::init(MONGO_URI, DB_NAME, COLLECTION).await?;
            storage.read_by_name(&self.name).await
        });
        match found {
            Ok(Some(doc)) => match doc.to_grid() {
                Ok(grid) => {
                    *self.preview.borrow_mut() =
                        Some(triangulate_surface(&grid, doc.params.cell_size));
                    self.show_grid(ctx, grid, doc.seed());
                    self.status_message = format!("Loaded '{}' (seed {})", doc.name, doc.seed());
                }
                Err(e) => self.status_message = format!("Corrupt document: {}", e),
            },
            Ok(None) => self.status_message = format!("No cave named '{}'", self.name),
            Err(e) => self.status_message = format!("DB error: {}", e),
        }
    }
}

// Top-down view of the soil surface, scaled to fit `rect`
fn paint_surface(painter: &egui::Painter, rect: Rect, mesh: &Mesh) {
    let top: Vec<_> = mesh
        .triangles
        .iter()
        .filter(|t| t.iter().all(|&i| mesh.points[i as usize].y == 0.0))
        .collect();
    if top.is_empty() {
        return;
    }
    let (mut min, mut max) = (glam::Vec2::splat(f32::MAX), glam::Vec2::splat(f32::MIN));
    for p in &mesh.points {
        min = min.min(glam::Vec2::new(p.x, p.z));
        max = max.max(glam::Vec2::new(p.x, p.z));
    }
    let extent = (max - min).max(glam::Vec2::splat(1e-3));
    let scale = (rect.width() / extent.x).min(rect.height() / extent.y);
    // +z is up on screen
    let project = |i: u32| {
        let p = mesh.points[i as usize];
        Pos2::new(
            rect.left() + (p.x - min.x) * scale,
            rect.top() + (max.y - p.z) * scale,
        )
    };

    let mut out = egui::epaint::Mesh::default();
    for tri in top {
        let base = out.vertices.len() as u32;
        for &i in tri {
            out.colored_vertex(project(i), Color32::from_rgb(102, 51, 0));
        }
        out.add_triangle(base, base + 1, base + 2);
    }
    painter.add(egui::epaint::Shape::mesh(out));
}

impl App for CaveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Cave Generator");
            ui.separator();

            ui.label("Width");
            ui.add(egui::Slider::new(&mut self.width, 16..=384));
            ui.label("Height");
            ui.add(egui::Slider::new(&mut self.height, 16..=256));
            ui.label("Fill %");
            ui.add(egui::Slider::new(&mut self.fill_percent, 0..=100));
            ui.label("Smoothing steps");
            ui.add(egui::Slider::new(&mut self.steps, 0..=40));
            ui.label("Corridor width");
            ui.add(egui::Slider::new(&mut self.corridor_width, 1..=6));
            ui.label("Growth % per regenerate");
            ui.add(egui::Slider::new(&mut self.growth_percent, 0.0..=10.0));

            ui.checkbox(&mut self.random_seed, "Random seed");
            ui.add_enabled_ui(!self.random_seed, |ui| {
                ui.label("Seed");
                ui.add(egui::DragValue::new(&mut self.seed).speed(1.0));
            });

            ui.label("Name");
            ui.text_edit_singleline(&mut self.name);

            ui.separator();

            if ui.button("Regenerate").clicked() {
                self.generate(ctx);
            }
            if ui.button("Save PNG…").clicked() {
                self.save_png();
            }
            if ui.button("Save to DB…").clicked() {
                self.save_to_db();
            }
            if ui.button("Load from DB…").clicked() {
                self.load_from_db(ctx);
            }

            ui.separator();
            ui.label(&self.status_message);
        });

        // central display
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(tex) = &self.cave_texture else {
                ui.centered_and_justified(|ui| {
                    ui.label("Click “Regenerate” to start");
                });
                return;
            };
            let half = egui::vec2(ui.available_width(), ui.available_height() * 0.5 - 8.0);
            ui.add(egui::Image::new((tex.id(), half)).maintain_aspect_ratio(true));
            ui.separator();
            ui.label("Soil surface:");
            let (rect, _) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
            if let Some(mesh) = self.preview.borrow().as_ref() {
                paint_surface(ui.painter(), rect, mesh);
            }
        });
    }
}

fn main() -> eframe::Result {
    // CAVE_LOG=trace|debug|info|warn|error
    let level = std::env::var("CAVE_LOG")
        .ok()
        .and_then(|s| s.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }

    let opts = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    run_native(
        "Cave Generator",
        opts,
        Box::new(|_cc| Ok(Box::new(CaveApp::default()))),
    )
}
