//! Terminal merge-drop runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `merge_drop::term`.
//! The engine is advanced in fixed `TICK_MS` steps.

use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyEventKind};

use merge_drop::core::{EngineConfig, EngineSnapshot};
use merge_drop::engine::ResolutionEngine;
use merge_drop::input::{handle_key_event, handle_mouse_event, should_quit, ColumnHitbox};
use merge_drop::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use merge_drop::types::{EngineEvent, PlayerCommand, TICK_MS};

#[derive(Debug, Clone, Copy)]
struct Options {
    seed: Option<u32>,
    mouse: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut opts = Options {
        seed: None,
        mouse: true,
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().context("--seed needs a value")?;
                let seed: u32 = value
                    .parse()
                    .with_context(|| format!("invalid seed: {value}"))?;
                opts.seed = Some(seed);
            }
            "--no-mouse" => opts.mouse = false,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(opts)
}

fn init_logging() -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Ok(path) = std::env::var("MERGE_DROP_LOG_FILE") {
        let file = File::create(&path).with_context(|| format!("open log file {path}"))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let opts = parse_args(std::env::args().skip(1))?;

    let mut config = EngineConfig::from_env();
    if let Some(seed) = opts.seed {
        config = config.with_seed(seed);
    }
    let engine = ResolutionEngine::new(config).context("invalid engine configuration")?;

    let mut term = TerminalRenderer::new();
    if !opts.mouse {
        term = term.without_mouse();
    }
    term.enter()?;

    let result = run(&mut term, engine);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, mut engine: ResolutionEngine) -> Result<()> {
    engine.start();

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = EngineSnapshot::new(engine.config().rows, engine.config().cols);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);

        engine.snapshot_into(&mut snap);
        view.render_into(&snap, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            let command = match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    handle_key_event(key)
                }
                Event::Mouse(mouse) => {
                    let geo = view.geometry(snap.rows, snap.cols, viewport);
                    let hitbox = ColumnHitbox {
                        left: geo.columns_x,
                        top: geo.preview_y,
                        bottom: geo.frame_y + geo.frame_h,
                        pitch: geo.pitch,
                        cols: snap.cols,
                    };
                    handle_mouse_event(mouse, &hitbox)
                }
                Event::Resize(..) => {
                    term.invalidate();
                    None
                }
                _ => None,
            };
            if let Some(command) = command {
                apply_command(&mut engine, command)?;
            }
        }

        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            engine.tick(TICK_MS)?;
            for event in engine.drain_events() {
                log_event(&event);
            }
        }
    }
}

fn apply_command(engine: &mut ResolutionEngine, command: PlayerCommand) -> Result<()> {
    match command {
        PlayerCommand::ShiftPointer(delta) => {
            let col = engine.pointer_column() as i32 + delta as i32;
            engine.set_pointer_column(col);
        }
        PlayerCommand::PointAt(col) => engine.set_pointer_column(col as i32),
        PlayerCommand::DropAtPointer => {
            let col = engine.pointer_column() as i32;
            engine.on_column_chosen(col)?;
        }
        PlayerCommand::DropInto(col) => {
            engine.set_pointer_column(col as i32);
            engine.on_column_chosen(col as i32)?;
        }
        PlayerCommand::Restart => engine.restart(),
    }
    Ok(())
}

fn log_event(event: &EngineEvent) {
    match event {
        EngineEvent::GameOver { score } => log::info!("final score {}", score),
        EngineEvent::ValueUnlocked(v) => log::debug!("spawn pool now includes {}", v),
        other => log::trace!("{:?}", other),
    }
}
