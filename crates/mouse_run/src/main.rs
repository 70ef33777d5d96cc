//! mouse-run - drops a mouse into a maze and lets it find the cheese.
//!
//! The mouse explores the maze, maps the rest of it, drives home and then
//! takes the best route to the goal. Finished maps are remembered, so the
//! next run on the same maze skips straight to the route.
//!
//! Storage locations:
//! - Linux: ~/.local/share/micromouse/
//! - Windows: %APPDATA%\micromouse\
//! - MacOS: ~/Library/Application Support/micromouse/

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use micromouse::prelude::*;
use micromouse::storage::memory_key;
use tracing::{debug, info, warn};

mod demo;
mod paths;
mod render;
mod store;

use paths::AppPaths;
use store::FileStore;

#[derive(Debug, Default)]
struct Options {
    speed: Option<MouseSpeed>,
    cost: Option<CostMode>,
    maze: Option<PathBuf>,
    forget: bool,
    no_home: bool,
}

fn usage() -> ! {
    eprintln!("mouse-run (explores a maze, then routes to its goal)");
    eprintln!("Usage: mouse-run [options]\n");
    eprintln!("Options:");
    eprintln!("  --speed <insta|fast|medium|slow>  Dwell between steps");
    eprintln!("  --cost <distance|time>            What the final route minimises");
    eprintln!("  --maze <layout.json>              Maze layout (default: built-in demo)");
    eprintln!("  --forget                          Drop the remembered map first");
    eprintln!("  --no-home                         Stay put after mapping");
    eprintln!("\nConfig: config.json in the data directory; flags override it.");
    process::exit(2);
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--speed" => {
                let v = args.next().ok_or("--speed needs a value")?;
                opts.speed =
                    Some(MouseSpeed::from_name(&v).ok_or_else(|| format!("Unknown speed: {v}"))?);
            }
            "--cost" => {
                let v = args.next().ok_or("--cost needs a value")?;
                opts.cost =
                    Some(CostMode::from_name(&v).ok_or_else(|| format!("Unknown cost mode: {v}"))?);
            }
            "--maze" => {
                let v = args.next().ok_or("--maze needs a path")?;
                opts.maze = Some(PathBuf::from(v));
            }
            "--forget" => opts.forget = true,
            "--no-home" => opts.no_home = true,
            "-h" | "--help" => usage(),
            other => return Err(format!("Unknown argument: {other}")),
        }
    }
    Ok(opts)
}

fn load_config(path: &Path) -> MouseConfig {
    match fs::read_to_string(path) {
        Ok(s) => match serde_json::from_str::<MouseConfig>(&s) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Ignoring unreadable config {:?}: {}", path, e);
                MouseConfig::default()
            }
        },
        Err(_) => MouseConfig::default(),
    }
}

fn load_layout(path: Option<&Path>) -> Result<MazeLayout, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let s = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read maze {:?}: {}", path, e))?;
            Ok(serde_json::from_str(&s)?)
        }
        None => Ok(demo::layout()),
    }
}

/// Logs what the mouse is doing.
#[derive(Debug, Default)]
struct LogObserver {
    moves: u64,
}

impl MouseObserver for LogObserver {
    fn on_mouse_moved(&mut self, suppress_redraw: bool) {
        if !suppress_redraw {
            self.moves += 1;
            if self.moves % 50 == 0 {
                debug!("{} moves so far", self.moves);
            }
        }
    }

    fn on_mouse_changed_state(&mut self, state: MouseState) {
        info!("Mouse is {}", state.as_str());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(o) => o,
        Err(msg) => {
            eprintln!("{msg}\n");
            usage();
        }
    };

    let paths = AppPaths::new()?;
    info!("Data directory: {:?}", paths.data_dir());

    let mut config = load_config(&paths.config_file());
    if let Some(speed) = opts.speed {
        config = config.with_speed(speed);
    }
    if let Some(cost) = opts.cost {
        config = config.with_cost_mode(cost);
    }
    if opts.no_home {
        config = config.with_return_home(false);
    }
    config
        .validate()
        .map_err(|e| format!("Invalid config: {e}"))?;

    let layout = load_layout(opts.maze.as_deref())?;
    let maze = GridMaze::from_layout(&layout)?;
    println!("{}", render::render(&maze, None));

    let mut store = FileStore::new(paths.memory_dir())?;
    if opts.forget {
        store.remove(&memory_key(&layout.name));
        info!("Forgot maze {}", layout.name);
    }

    let mouse = Mouse::new(maze, config)?
        .with_observer(LogObserver::default())
        .with_store(store);

    // Ctrl-C stops the mouse at the next step; the map so far is kept in memory.
    let stop = mouse.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C: stopping after the current step");
            stop.stop();
        }
    });

    let (dx, dy) = demo::offset_in_mouse_frame(layout.start, layout.goal);
    let cost_mode = config.cost_mode;
    let mouse = tokio::task::spawn_blocking(move || -> Result<_, MouseError> {
        let mut mouse = mouse;
        let mut pacer = ThreadPacer;
        if mouse.state() != MouseState::Finished {
            mouse.solve(&mut pacer)?;
        }
        if mouse.state() == MouseState::Finished {
            // The goal offset is measured from the start cell.
            let home = mouse.home();
            let here = mouse.location();
            let to_x = home.x as i32 + dx - here.x as i32;
            let to_y = home.y as i32 + dy - here.y as i32;
            mouse.goto(to_x, to_y, cost_mode, &mut pacer)?;
        }
        Ok(mouse)
    })
    .await??;

    let stats = mouse.stats();
    println!("{}", render::render(&mouse, Some(CellText::PathBy)));
    println!(
        "state: {}  moves: {}  turns: {}  backtracks: {}  junctions: {}  known: {}/{}",
        mouse.state().as_str(),
        stats.moves,
        stats.turns,
        stats.backtracks,
        stats.junctions,
        mouse.memory().explored_cells(),
        mouse.memory().total_cells()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags() {
        let opts = parse_args(args(&["--speed", "slow", "--cost", "distance", "--forget"])).unwrap();
        assert_eq!(opts.speed, Some(MouseSpeed::Slow));
        assert_eq!(opts.cost, Some(CostMode::Distance));
        assert!(opts.forget);
        assert!(!opts.no_home);
        assert!(opts.maze.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_args(args(&["--speed", "warp"])).is_err());
        assert!(parse_args(args(&["--cost"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let cfg = load_config(Path::new("/definitely/not/here/config.json"));
        assert_eq!(cfg, MouseConfig::default());
    }
}
