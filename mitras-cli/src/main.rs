//! `mitras` CLI: evaluate a list of expressions and draw them as SVG.

use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;

use mitras_core::expr::{ExprId, ExprKind, ExprList, ExprRecord};
use mitras_core::scene::Scene;
use mitras_graphics::canvas::Canvas;
use mitras_graphics::types::{Color, Point, Scalar};
use mitras_graphics::viewport::Viewport;
use mitras_svg::{RenderOptions, render_to_string};

/// Wheel delta of one zoom notch, as a browser reports it.
const WHEEL_NOTCH: Scalar = 100.0;

#[derive(Parser)]
#[command(version, about = "mitras: evaluate TeX expressions and draw them on a grid")]
struct Cli {
    /// File with one expression per line; lines starting with `%` are comments
    file: Option<String>,

    /// Expression to evaluate (repeatable, used instead of a file)
    #[arg(short = 'e', long = "eval")]
    eval: Vec<String>,

    /// Output directory for SVG files
    #[arg(short, long, default_value = ".")]
    output: String,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: Scalar,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: Scalar,

    /// Pixels between major grid lines
    #[arg(long)]
    step_px: Option<Scalar>,

    /// Zoom notches around the canvas center; negative zooms out
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    zoom: i32,

    /// Opaque background color as `#rrggbb`
    #[arg(long, value_parser = parse_color)]
    background: Option<Color>,

    /// Write animation frames for the expression with this id
    #[arg(long, value_name = "ID")]
    animate: Option<u64>,

    /// Maximum number of animation frames to write
    #[arg(long, value_name = "N")]
    frames: Option<usize>,

    /// Animation frames per second
    #[arg(long, default_value_t = 30.0)]
    fps: Scalar,
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::from_hex(s).map_err(|e| e.to_string())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut list = ExprList::new();
    list.load(read_records(&cli));
    print_analyses(&list);

    let mut viewport = Viewport::new(cli.width, cli.height);
    if let Some(step_px) = cli.step_px {
        if step_px <= 0.0 {
            eprintln!("Error: --step-px must be positive");
            process::exit(1);
        }
        viewport.step_px = step_px;
    }
    let center = Point::new(cli.width / 2.0, cli.height / 2.0);
    for _ in 0..cli.zoom.unsigned_abs() {
        viewport.zoom(-Scalar::from(cli.zoom.signum()) * WHEEL_NOTCH, center);
    }

    let opts = RenderOptions {
        background: cli.background,
        ..RenderOptions::default()
    };
    if let Err(e) = fs::create_dir_all(&cli.output) {
        eprintln!("Error creating {}: {e}", cli.output);
        process::exit(1);
    }
    let scene = Scene::default();
    let mut canvas = Canvas::new(cli.width, cli.height);

    scene.draw(&mut canvas, &viewport, list.records_mut(), false);
    write_svg(&cli.output, "graph.svg", &render_to_string(&canvas, &opts));

    if let Some(id) = cli.animate {
        if !list.request_animation(ExprId(id)) {
            eprintln!("Error: no expression with id {id}");
            process::exit(1);
        }
        write_frames(&cli, &scene, &mut list, &viewport, &opts);
    }
}

/// One record per non-empty input line.
fn read_records(cli: &Cli) -> Vec<ExprRecord> {
    let lines: Vec<String> = if !cli.eval.is_empty() {
        cli.eval.clone()
    } else if let Some(ref file) = cli.file {
        match fs::read_to_string(file) {
            Ok(s) => s.lines().map(str::to_owned).collect(),
            Err(e) => {
                eprintln!("Error reading {file}: {e}");
                process::exit(1);
            }
        }
    } else {
        eprintln!("No input file or expression specified");
        process::exit(1);
    };

    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .zip(0..)
        .map(|(line, id)| match line.strip_prefix('%') {
            Some(text) => ExprRecord::new(ExprId(id), ExprKind::Comment, text.trim()),
            None => ExprRecord::new(ExprId(id), ExprKind::Math, line),
        })
        .collect()
}

fn print_analyses(list: &ExprList) {
    for record in list.records() {
        if record.is_comment() {
            println!("{}: % {}", record.id(), record.source);
            continue;
        }
        let analysis = &record.analysis;
        let function = if analysis.primary_function.is_empty() {
            "-"
        } else {
            analysis.primary_function.as_str()
        };
        println!(
            "{}: {} => {} [{}, {function}]",
            record.id(),
            record.source,
            analysis.evaluated_tex,
            analysis.kind,
        );
    }
}

#[expect(clippy::cast_precision_loss, reason = "frame indices are small")]
fn write_frames(
    cli: &Cli,
    scene: &Scene,
    list: &mut ExprList,
    viewport: &Viewport,
    opts: &RenderOptions,
) {
    let mut canvas = Canvas::new(cli.width, cli.height);
    if !scene.draw(&mut canvas, viewport, list.records_mut(), true) {
        log::warn!("expression has nothing to animate");
        return;
    }
    let frame_ms = 1000.0 / cli.fps.max(1.0);
    let limit = cli.frames.unwrap_or(usize::MAX);
    let mut frame = 0;
    while frame < limit {
        let running = scene.tick(&mut canvas, viewport, list.records_mut(), frame as Scalar * frame_ms);
        let name = format!("graph.{frame:03}.svg");
        write_svg(&cli.output, &name, &render_to_string(&canvas, opts));
        frame += 1;
        if !running {
            break;
        }
    }
    log::info!("wrote {frame} animation frames");
}

fn write_svg(output_dir: &str, filename: &str, content: &str) {
    let path = Path::new(output_dir).join(filename);
    match fs::write(&path, content) {
        Ok(()) => log::info!("wrote {}", path.display()),
        Err(e) => eprintln!("Error writing {}: {e}", path.display()),
    }
}
