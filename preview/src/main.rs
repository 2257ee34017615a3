//! Desktop preview for the LED matrix core
//!
//! Runs the render and control contexts on their own threads, exactly as the
//! firmware does, and draws the matrix in a window. UI controls never touch
//! the controller directly, they post commands to the queue like any other
//! control surface.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration as StdDuration;

use eframe::egui;
use obegraensad_core::effect::{FillEffect, WaveEffect};
use obegraensad_core::{
    Button, CommandQueue, CommandSender, ControlCommand, Controller, CoreConfig, Duration,
    EffectId, FrameBuffer, Instant, MATRIX_HEIGHT, MATRIX_WIDTH, MemoryStore, PixelSurface,
    PluginManager, StatusFlag, TaskYield,
};

/// Command queue size
const QUEUE_SIZE: usize = 16;

/// Size of each pixel square on screen
const PIXEL_SIZE: f32 = 22.0;

/// Gap between pixels
const PIXEL_GAP: f32 = 3.0;

/// Pause between control loop iterations
const CONTROL_PERIOD: StdDuration = StdDuration::from_millis(10);

/// Pause between rendered frames
const RENDER_PERIOD: StdDuration = StdDuration::from_millis(16);

const PIXEL_COUNT: usize = MATRIX_WIDTH as usize * MATRIX_HEIGHT as usize;

const DEFAULT_SCHEDULE: &str = r#"[{"pluginId":1,"duration":3},{"pluginId":2,"duration":5},{"pluginId":3,"duration":5}]"#;

static STATUS: StatusFlag = StatusFlag::new();

static COMMANDS: CommandQueue<QUEUE_SIZE> = CommandQueue::new();

type Pixels = Arc<Mutex<[u8; PIXEL_COUNT]>>;

type PreviewController =
    Controller<'static, MemoryStore, PreviewDisplay, ThreadYield, QUEUE_SIZE>;

/// Frame buffer that mirrors every pixel write to the window
struct PreviewDisplay {
    frame: FrameBuffer,
    pixels: Pixels,
}

impl PixelSurface for PreviewDisplay {
    fn set_pixel(&mut self, x: u8, y: u8, on: bool, brightness: u8) {
        self.frame.set_pixel(x, y, on, brightness);
        if let Some(value) = self.frame.pixel(x, y) {
            let index = usize::from(y) * usize::from(MATRIX_WIDTH) + usize::from(x);
            if let Ok(mut pixels) = self.pixels.lock() {
                pixels[index] = value;
            }
        }
    }

    fn clear(&mut self) {
        self.frame.clear();
        if let Ok(mut pixels) = self.pixels.lock() {
            pixels.fill(0);
        }
    }

    fn render_buffer(&self) -> &[u8] {
        self.frame.render_buffer()
    }
}

/// Yields by sleeping the calling thread
struct ThreadYield;

impl TaskYield for ThreadYield {
    fn yield_for(&mut self, slice: Duration) {
        thread::sleep(StdDuration::from_millis(slice.as_millis()));
    }
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let pixels: Pixels = Arc::new(Mutex::new([0; PIXEL_COUNT]));
    let controller = Arc::new(Mutex::new(build_controller(Arc::clone(&pixels))));
    let effects = effect_names(&controller);

    spawn_control(Arc::clone(&controller));
    spawn_render(Arc::clone(&controller));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 520.0])
            .with_title("Obegraensad Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "obegraensad-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new(controller, pixels, effects)))),
    )
}

fn build_controller(pixels: Pixels) -> PreviewController {
    let display = PreviewDisplay {
        frame: FrameBuffer::new(),
        pixels,
    };
    let manager = PluginManager::new(
        &STATUS,
        MemoryStore::new(),
        display,
        ThreadYield,
        CoreConfig::default(),
    );
    let mut controller = Controller::new(manager, COMMANDS.receiver());
    controller.register(Box::new(FillEffect::new(120)));
    controller.register(Box::new(WaveEffect::default()));
    controller.register(Box::new(
        WaveEffect::default()
            .with_cycle_duration(Duration::from_secs(6))
            .with_brightness(60),
    ));
    controller.boot(Instant::now());
    controller
}

fn effect_names(controller: &Mutex<PreviewController>) -> Vec<(EffectId, String)> {
    let Ok(controller) = controller.lock() else {
        return Vec::new();
    };
    controller
        .manager()
        .registry()
        .iter()
        .map(|descriptor| (descriptor.id(), descriptor.name().to_string()))
        .collect()
}

/// Control context: drains commands and drives the scheduler
fn spawn_control(controller: Arc<Mutex<PreviewController>>) {
    thread::spawn(move || {
        loop {
            if let Ok(mut controller) = controller.lock() {
                controller.tick(Instant::now());
            }
            thread::sleep(CONTROL_PERIOD);
        }
    });
}

/// Render context: runs the active effect once per frame
fn spawn_render(controller: Arc<Mutex<PreviewController>>) {
    thread::spawn(move || {
        loop {
            if let Ok(mut controller) = controller.lock() {
                controller.render(Instant::now());
            }
            thread::sleep(RENDER_PERIOD);
        }
    });
}

struct PreviewApp {
    controller: Arc<Mutex<PreviewController>>,
    pixels: Pixels,
    sender: CommandSender<'static, QUEUE_SIZE>,
    /// Registered effects, in id order
    effects: Vec<(EffectId, String)>,
    /// Schedule being edited
    schedule: String,
    /// Last state report, refreshed whenever the controller is free
    report: String,
}

impl PreviewApp {
    fn new(
        controller: Arc<Mutex<PreviewController>>,
        pixels: Pixels,
        effects: Vec<(EffectId, String)>,
    ) -> Self {
        Self {
            controller,
            pixels,
            sender: COMMANDS.sender(),
            effects,
            schedule: DEFAULT_SCHEDULE.to_string(),
            report: String::new(),
        }
    }

    fn send(&self, command: ControlCommand) {
        if let Err(err) = self.sender.post(command) {
            log::warn!("preview: command queue full, dropping {:?}", err.0);
        }
    }

    fn refresh_report(&mut self) {
        if let Ok(controller) = self.controller.try_lock() {
            self.report = controller.report().to_json();
        }
    }

    fn draw_matrix(&self, ui: &mut egui::Ui) {
        let pitch = PIXEL_SIZE + PIXEL_GAP;
        let side = f32::from(MATRIX_WIDTH) * pitch;
        let (response, painter) =
            ui.allocate_painter(egui::vec2(side, side), egui::Sense::hover());
        let origin = response.rect.min;
        painter.rect_filled(response.rect, 4.0, egui::Color32::from_gray(12));

        let Ok(pixels) = self.pixels.lock() else {
            return;
        };
        for (index, &value) in pixels.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let (x, y) = (
                (index % usize::from(MATRIX_WIDTH)) as u8,
                (index / usize::from(MATRIX_WIDTH)) as u8,
            );
            let rect = egui::Rect::from_min_size(
                egui::pos2(
                    origin.x + f32::from(x) * pitch,
                    origin.y + f32::from(y) * pitch,
                ),
                egui::vec2(PIXEL_SIZE, PIXEL_SIZE),
            );
            let glow = 30u8.saturating_add(value / 8 * 7);
            let color = if value == 0 {
                egui::Color32::from_gray(30)
            } else {
                egui::Color32::from_rgb(glow, glow, glow.saturating_sub(20))
            };
            painter.rect_filled(rect, 11.0, color);
        }
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_report();
        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                self.draw_matrix(ui);

                ui.add_space(16.0);

                ui.vertical(|ui| {
                    ui.label(format!("Status: {}", STATUS.load().as_str()));

                    ui.add_space(8.0);

                    ui.horizontal_wrapped(|ui| {
                        for (id, name) in &self.effects {
                            if ui.button(format!("{id}: {name}")).clicked() {
                                self.send(ControlCommand::ActivateById(*id));
                            }
                        }
                    });

                    ui.add_space(8.0);

                    ui.horizontal(|ui| {
                        if ui.button("Button: press").clicked() {
                            self.send(ControlCommand::Button(Button::Single));
                        }
                        if ui.button("Button: hold").clicked() {
                            self.send(ControlCommand::Button(Button::Long));
                        }
                    });

                    ui.add_space(8.0);

                    ui.label("Schedule:");
                    ui.add(
                        egui::TextEdit::multiline(&mut self.schedule)
                            .code_editor()
                            .desired_rows(4),
                    );
                    ui.horizontal(|ui| {
                        if ui.button("Set").clicked() {
                            self.send(ControlCommand::SetSchedule(self.schedule.clone()));
                        }
                        if ui.button("Start").clicked() {
                            self.send(ControlCommand::StartSchedule);
                        }
                        if ui.button("Stop").clicked() {
                            self.send(ControlCommand::StopSchedule);
                        }
                        if ui.button("Clear").clicked() {
                            self.send(ControlCommand::ClearSchedule {
                                erase_storage: true,
                            });
                        }
                    });

                    ui.add_space(8.0);

                    ui.label("State:");
                    ui.add(
                        egui::Label::new(egui::RichText::new(&self.report).monospace())
                            .wrap(),
                    );
                });
            });
        });
    }
}
