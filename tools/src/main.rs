//! rewind-runner: headless driver for the rewind engine over a sandbox host.
//!
//! Usage:
//!   rewind-runner --seed 12345 --ticks 3600 --fps 60
//!   rewind-runner --config rewind.json --rewind-every 900 --travel-every 1500
//!   rewind-runner --seed 12345 --ipc-mode

use anyhow::Result;
use rewind_core::{
    rng::LatencyRng,
    sandbox::{LoadPlan, SandboxHost},
    types::{Tick, Vec2, Vec3},
    FrameInput, RewindConfig, RewindEngine, RewindEvent,
};
use std::collections::BTreeMap;
use std::env;
use std::io::{self, BufRead, Write};

const LOCATIONS: [&str; 4] = ["Dirtmouth", "Crossroads", "Greenpath", "Fog Canyon"];

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Rewind,
    Travel { location: String },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    tick: Tick,
    elapsed_secs: f64,
    location: Option<String>,
    loading: bool,
    subject_present: bool,
    position: Option<Vec3>,
    restoring: bool,
    phase: Option<&'static str>,
    snapshots: usize,
    capacity: usize,
    save_timer: f64,
    /// Events raised by the command this state answers.
    events: Vec<RewindEvent>,
}

struct Session {
    engine: RewindEngine,
    host: SandboxHost,
    dt: f64,
    counts: BTreeMap<&'static str, u64>,
}

impl Session {
    fn new(config: RewindConfig, seed: u64, fps: u32) -> Result<Self> {
        let engine = RewindEngine::new(config)?;
        let plan = LoadPlan {
            load_frames: fps / 2,
            load_jitter: fps / 2,
            spawn_delay_frames: fps / 10,
            entry_frames: fps / 4,
            ..LoadPlan::default()
        };
        let mut host = SandboxHost::new(LOCATIONS[0])
            .with_plan(plan)
            .with_rng(LatencyRng::new(seed));
        for (i, location) in LOCATIONS.iter().enumerate() {
            host = host.with_spawn_point(location, Vec3::new(i as f32 * 32.0, 0.0, 0.0));
        }
        Ok(Self {
            engine,
            host,
            dt: 1.0 / f64::from(fps.max(1)),
            counts: BTreeMap::new(),
        })
    }

    fn frame(&mut self, rewind: bool) -> Vec<RewindEvent> {
        self.host.step(self.dt);
        let events = self.engine.tick(
            &mut self.host,
            FrameInput { dt: self.dt, rewind_pressed: rewind },
        );
        for event in &events {
            *self.counts.entry(event.kind()).or_default() += 1;
        }
        events
    }

    fn travel(&mut self, location: &str) -> bool {
        if self.engine.is_restoring() || self.host.is_loading() {
            log::debug!("travel to {location} refused: busy");
            return false;
        }
        if self.host.location() == Some(location) {
            return false;
        }
        self.host.travel(location);
        true
    }

    fn ui_state(&self, events: Vec<RewindEvent>) -> UiState {
        let subject = self.host.subject.as_ref();
        UiState {
            tick: self.engine.clock.current_tick,
            elapsed_secs: self.engine.clock.now(),
            location: self.host.location().map(str::to_string),
            loading: self.host.is_loading(),
            subject_present: subject.is_some(),
            position: subject.map(|s| s.position),
            restoring: self.engine.is_restoring(),
            phase: self.engine.restore_phase().map(|p| p.name()),
            snapshots: self.engine.history().len(),
            capacity: self.engine.history().capacity(),
            save_timer: self.engine.save_timer(),
            events,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 3_600u64);
    let fps = parse_arg(&args, "--fps", 60u32);
    let rewind_every = parse_arg(&args, "--rewind-every", 0u64);
    let travel_every = parse_arg(&args, "--travel-every", 0u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => RewindConfig::load(path)?,
        None => RewindConfig::default(),
    };

    if !ipc_mode {
        println!("rewind-runner");
        println!("  seed:          {seed}");
        println!("  ticks:         {ticks}");
        println!("  fps:           {fps}");
        println!("  config:        {}", config_path.unwrap_or("(defaults)"));
        println!("  interval:      {}s", config.save_interval_secs);
        println!("  max snapshots: {}", config.max_snapshots);
        println!();
    }

    let mut session = Session::new(config, seed, fps)?;

    if ipc_mode {
        run_ipc_loop(&mut session)?;
    } else {
        run_wander(&mut session, seed, ticks, rewind_every, travel_every);
        print_summary(&session, ticks);
    }

    Ok(())
}

/// Wander between locations, drift the subject around and press rewind
/// on a fixed cadence.
fn run_wander(session: &mut Session, seed: u64, ticks: u64, rewind_every: u64, travel_every: u64) {
    let mut rng = LatencyRng::new(seed.rotate_left(17));

    for i in 1..=ticks {
        if let Some(subject) = session.host.subject.as_mut() {
            if let Some(body) = subject.body.as_mut() {
                if rng.chance(0.05) {
                    body.velocity = Vec2::new(rng.signed(6.0), rng.signed(2.0));
                }
            }
        }

        if travel_every > 0 && i % travel_every == 0 {
            let target = LOCATIONS[rng.next_u64_below(LOCATIONS.len() as u64) as usize];
            session.travel(target);
        }

        let rewind = rewind_every > 0 && i % rewind_every == 0;
        session.frame(rewind);
    }
}

fn run_ipc_loop(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        let events = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Vec::new(),
            IpcCommand::Tick { count } => {
                let mut events = Vec::new();
                for _ in 0..count {
                    events.extend(session.frame(false));
                }
                events
            }
            IpcCommand::Rewind => session.frame(true),
            IpcCommand::Travel { location } => {
                if !session.travel(&location) {
                    log::warn!("Travel to {location} ignored");
                }
                Vec::new()
            }
        };

        let state = session.ui_state(events);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(session: &Session, ticks: u64) {
    let count = |kind: &str| session.counts.get(kind).copied().unwrap_or(0);

    println!("=== RUN SUMMARY ===");
    println!("  ticks run:         {ticks}");
    println!("  final tick:        {}", session.engine.clock.current_tick);
    println!("  simulated time:    {:.1}s", session.engine.clock.now());
    println!("  location:          {}", session.host.location().unwrap_or("-"));
    println!(
        "  history:           {}/{}",
        session.engine.history().len(),
        session.engine.history().capacity()
    );
    println!("  snapshots taken:   {}", count("snapshot_taken"));
    println!("  snapshots evicted: {}", count("snapshot_evicted"));
    println!("  captures skipped:  {}", count("capture_skipped"));
    println!("  restores started:  {}", count("restore_started"));
    println!("    cross-location:  {}", count("location_load_requested"));
    println!("    completed:       {}", count("restore_completed"));
    println!("    stalled:         {}", count("restore_stalled"));
    println!("  rewinds rejected:  {}", count("restore_rejected"));
    if session.engine.is_restoring() {
        println!("  (a restore was still in progress at exit)");
    }

    println!();
    println!("=== EVENT COUNTS ===");
    for (kind, n) in &session.counts {
        println!("  {kind:<24} {n}");
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
