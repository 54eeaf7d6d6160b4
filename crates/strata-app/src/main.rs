// strata: drives the render pass over a synthetic desktop, headless by
// default or on an offscreen wgpu device, and logs what each frame cost.

mod gpu;
mod scene;
mod settings;

use clap::Parser;

use strata_core::{GraphicsDevice, IRect, Monitor, Region, Size};
use strata_renderer::{HeadlessDevice, RenderContext};

use scene::{Scene, SceneTextures, WINDOW_COUNT};
use settings::StrataSettings;

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "Render pass and batching frame driver")]
#[command(version)]
struct Args {
    /// Render on an offscreen wgpu device instead of the command recorder
    #[arg(long)]
    gpu: bool,

    /// Number of frames to render
    #[arg(long, default_value = "120")]
    frames: u64,

    /// Draw occlusion and blur overlays and log per-element verdicts
    #[arg(long)]
    debug_pass: bool,

    /// Write the effective settings to the config dir and exit
    #[arg(long)]
    init_settings: bool,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    if args.init_settings {
        settings::save_settings(&settings);
        return Ok(());
    }

    let output = &settings.output;
    let monitor = Monitor::new(Size::new(output.width as f32, output.height as f32), output.scale);

    let (device, textures): (Box<dyn GraphicsDevice>, SceneTextures) = if args.gpu {
        gpu::offscreen_device(output, WINDOW_COUNT)?
    } else {
        (Box::new(HeadlessDevice::new()), SceneTextures::numbered(WINDOW_COUNT))
    };

    let mut ctx = RenderContext::new(device, monitor, settings.batch.clone(), settings.blur.clone())?;
    ctx.set_debug_pass(args.debug_pass);

    let mut scene = Scene::new(monitor.logical_size(), textures, settings.blur.enabled);
    run_frames(&mut ctx, &mut scene, &settings, args.frames);
    Ok(())
}

fn run_frames(ctx: &mut RenderContext, scene: &mut Scene, settings: &StrataSettings, frames: u64) {
    let monitor = *ctx.monitor();
    let mut totals = Totals::default();

    for _ in 0..frames {
        let damage = if scene.frame() == 0 {
            scene.step();
            Region::from(monitor.bounds())
        } else {
            scene
                .step()
                .into_iter()
                .map(|rect| rect.scale(monitor.scale).round_out())
                .collect::<Region>()
        };

        let mut pass = scene.build_pass();
        ctx.begin_frame();
        let outcome = pass.render(ctx, &damage);
        ctx.end_frame();

        let discarded = pass.entries().iter().filter(|e| e.is_discarded()).count();
        let (_, batches) = ctx.split();
        let metrics = batches.metrics();
        batches.reset_metrics();

        log::debug!(
            "frame {}: damage {} px, presented {} px, discarded {}/{}, {} batched draws, {} state changes, {} texture binds",
            scene.frame(),
            damage.area(),
            outcome.damage.area(),
            discarded,
            pass.len(),
            metrics.draw_calls,
            metrics.state_changes,
            metrics.texture_binds,
        );
        if outcome.precompute_blur {
            log::trace!("frame {} samples the precomputed blur", scene.frame());
        }

        totals.frames += 1;
        totals.presented += outcome.damage.area();
        totals.discarded += discarded as u64;
        totals.elements += pass.len() as u64;
        totals.draw_calls += metrics.draw_calls;
    }

    totals.report(&monitor.bounds(), settings);
}

#[derive(Default)]
struct Totals {
    frames: u64,
    presented: i64,
    discarded: u64,
    elements: u64,
    draw_calls: u64,
}

impl Totals {
    fn report(&self, bounds: &IRect, settings: &StrataSettings) {
        if self.frames == 0 {
            log::info!("no frames rendered");
            return;
        }
        let full = bounds.area() * self.frames as i64;
        log::info!(
            "{} frames: presented {:.1}% of full repaint, discarded {}/{} elements, {} batched draws (instancing {}, blur radius {})",
            self.frames,
            self.presented as f64 * 100.0 / full.max(1) as f64,
            self.discarded,
            self.elements,
            self.draw_calls,
            settings.batch.instancing,
            settings.blur.one_blur_radius(),
        );
    }
}
