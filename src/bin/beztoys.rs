use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kurbo::{Point, Size, Vec2};

use beztoys::{
    Annotations, BezierShape, KurboEngine, Session, Toy as _, ToyCtx, ToyRack, builtin_toys,
};

#[derive(Parser, Debug)]
#[command(name = "beztoys", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available toys and their parameter descriptions.
    Toys,
    /// Run a scripted headless session and dump per-frame JSON traces.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input shape JSON; a built-in demo shape is drawn when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Toy to apply, by name (case-insensitive) or catalog index.
    #[arg(long, default_value = "Offset")]
    toy: String,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Hold animation paused, recomputing only on the initial edit.
    #[arg(long)]
    paused: bool,

    /// Output JSON path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
struct FrameTrace {
    frame: u64,
    elapsed: f64,
    recomputed: bool,
    toy: String,
    params: Vec<String>,
    derived: BezierShape,
    annotations: Annotations,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Toys => cmd_toys(),
        Command::Run(args) => cmd_run(args),
    }
}

fn cmd_toys() -> anyhow::Result<()> {
    let toys = builtin_toys();
    for (i, toy) in toys.iter().enumerate() {
        println!("{i}: {}", toy.name());
        for line in toy.describe_params() {
            println!("   {line}");
        }
    }
    Ok(())
}

fn read_shape_json(path: &Path) -> anyhow::Result<BezierShape> {
    let f = File::open(path).with_context(|| format!("open shape '{}'", path.display()))?;
    let r = BufReader::new(f);
    let shape: BezierShape = serde_json::from_reader(r).with_context(|| "parse shape JSON")?;
    Ok(shape)
}

/// Draws the fallback demo blob through the editor, the same way a user
/// would: four drag gestures with symmetric tangents.
fn draw_demo_shape(session: &mut Session) {
    let gestures = [
        (Point::new(250.0, 150.0), Point::new(320.0, 130.0)),
        (Point::new(550.0, 220.0), Point::new(560.0, 300.0)),
        (Point::new(420.0, 450.0), Point::new(340.0, 470.0)),
        (Point::new(180.0, 340.0), Point::new(170.0, 260.0)),
    ];
    for (press, release) in gestures {
        session.pointer_press(press);
        session.pointer_drag(release);
        session.pointer_release(release);
    }
}

fn select_toy(session: &mut Session, wanted: &str) -> anyhow::Result<()> {
    let names = session.rack().names();
    let index = match wanted.parse::<usize>() {
        Ok(i) if i < names.len() => i,
        Ok(i) => anyhow::bail!("toy index {i} out of range (0..{})", names.len()),
        Err(_) => names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(wanted))
            .with_context(|| format!("unknown toy '{wanted}' (available: {})", names.join(", ")))?,
    };
    for _ in 0..index {
        session.next_toy();
    }
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    if args.frames == 0 {
        anyhow::bail!("--frames must be > 0");
    }
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("--fps must be finite and > 0");
    }

    let viewport = Size::new(800.0, 600.0);
    let mut session = Session::new(Box::new(KurboEngine::new()), ToyRack::new(builtin_toys()));
    session.config_mut().pause_override = args.paused;

    match &args.in_path {
        Some(path) => {
            let shape = read_shape_json(path)?;
            *session.shape_mut() = shape;
            session.shape_mut().mark_changed();
        }
        None => draw_demo_shape(&mut session),
    }
    select_toy(&mut session, &args.toy)?;

    let center = Point::new(viewport.width * 0.5, viewport.height * 0.5);
    let mut traces = Vec::with_capacity(args.frames as usize);
    for frame in 0..args.frames {
        let elapsed = frame as f64 / args.fps;
        // Orbit the pointer around the center so the hit-test probes see a
        // moving target.
        let angle = elapsed * std::f64::consts::TAU / 10.0;
        let pointer = center + Vec2::new(angle.cos(), angle.sin()) * 100.0;

        let ctx = ToyCtx::new(elapsed, viewport, pointer);
        let recomputed = session.tick(&ctx)?;
        traces.push(FrameTrace {
            frame,
            elapsed,
            recomputed,
            toy: session.current_toy().name().to_string(),
            params: session.current_toy().describe_params(),
            derived: session.derived().clone(),
            annotations: session.annotations(),
        });
    }

    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(path)
                .with_context(|| format!("write trace '{}'", path.display()))?;
            serde_json::to_writer_pretty(f, &traces).with_context(|| "serialize traces")?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            serde_json::to_writer_pretty(std::io::stdout().lock(), &traces)
                .with_context(|| "serialize traces")?;
            println!();
        }
    }

    Ok(())
}
