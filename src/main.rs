//! Hand Rehab - command line driver
//!
//! Replays recorded landmark streams through a training session, runs a
//! synthetic demo session, or summarizes a saved session log.

use chrono::Local;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use handrehab::core::config::RehabConfig;
use handrehab::core::error::Result;
use handrehab::landmarks::handoff::{Detection, LatestFrameSlot};
use handrehab::landmarks::replay::read_stream;
use handrehab::landmarks::{Finger, LandmarkFrame, Pose, SyntheticHand};
use handrehab::recognition::{Gesture, ModeSelector, TrainingMode};
use handrehab::scoring::gesture_class::GestureClass;
use handrehab::scoring::template::{ReferenceTemplate, TemplateLibrary};
use handrehab::storage::{load_template_dir, SessionStore};
use handrehab::training::{CardSession, CardTask, RandomPhase, RandomSession, RehabEvent, SessionState};

#[derive(Parser, Debug)]
#[command(name = "handrehab")]
#[command(about = "Gesture training sessions for hand rehabilitation")]
struct Cli {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Frames per second of the replayed stream
    #[arg(long, global = true, default_value_t = 30.0)]
    fps: f32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a landmark stream through a random-mode session
    Random {
        /// JSON-lines landmark stream
        stream: PathBuf,
        /// Directory of gesture_<name>.json templates
        #[arg(long, default_value = "templates")]
        templates: PathBuf,
        /// Directory for the session log
        #[arg(long, default_value = "sessions")]
        out: PathBuf,
        /// Random seed for gesture selection and difficulty
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Replay a landmark stream through a card-mode session
    Card {
        /// JSON-lines landmark stream
        stream: PathBuf,
        /// Card payloads, armed in order whenever no card is active
        #[arg(long = "card")]
        cards: Vec<String>,
    },
    /// Pick a mode from the menu with a synthetic hand, then play that
    /// session with the hand mimicking each target
    Demo {
        /// Point one finger at the menu (card mode) instead of showing an open palm
        #[arg(long)]
        card: bool,
        /// Use recorded templates instead of the synthetic catalog
        #[arg(long)]
        templates: Option<PathBuf>,
        /// Save the session log here
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// Give up after this many seconds of simulated time
        #[arg(long, default_value_t = 900.0)]
        max_secs: f32,
    },
    /// Print the summary of a saved session log
    Summary {
        log: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("handrehab=info")))
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => RehabConfig::load(path)?,
        None => RehabConfig::default(),
    };
    let dt = 1.0 / cli.fps.max(1.0);

    match cli.command {
        Command::Random {
            stream,
            templates,
            out,
            seed,
        } => run_random(&config, &stream, &templates, &out, seed, dt),
        Command::Card { stream, cards } => run_card(&config, &stream, &cards, dt),
        Command::Demo {
            card,
            templates,
            out,
            seed,
            max_secs,
        } => {
            let menu_hand = if card { pointing_hand() } else { SyntheticHand::open_palm() };
            match select_mode(&config, &menu_hand.build(), max_secs, dt) {
                Some(TrainingMode::Random) => run_demo(&config, templates.as_deref(), out.as_deref(), seed, max_secs, dt),
                Some(TrainingMode::Card) => run_card_demo(&config, max_secs, dt),
                None => {
                    tracing::warn!("no mode selected from the menu");
                    Ok(())
                }
            }
        }
        Command::Summary { log } => {
            let log = SessionStore::load(&log)?;
            print!("{}", log.summary().render());
            Ok(())
        }
    }
}

fn load_stream(path: &Path) -> Result<Vec<Detection>> {
    read_stream(BufReader::new(File::open(path)?))
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

fn print_events(events: &[RehabEvent]) {
    for event in events {
        if matches!(event, RehabEvent::TaskProgress { .. }) {
            continue;
        }
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "unprintable event"),
        }
    }
}

fn run_random(
    config: &RehabConfig,
    stream: &Path,
    templates: &Path,
    out: &Path,
    seed: Option<u64>,
    dt: f32,
) -> Result<()> {
    let library = load_template_dir(templates)?;
    let mut session = RandomSession::new(config, library, Local::now().naive_local(), seeded_rng(seed))?;
    let store = SessionStore::new(out);
    let slot = LatestFrameSlot::new();
    let mut saved_rounds = 0;

    for detection in load_stream(stream)? {
        slot.publish(detection);
        let Some(detection) = slot.take() else {
            continue;
        };
        let events = session.tick(detection.frame(), dt);
        print_events(&events);

        if session.log().rounds.len() != saved_rounds {
            saved_rounds = session.log().rounds.len();
            store.save(session.log())?;
        }
        if session.is_finished() {
            break;
        }
    }

    let path = store.save(session.log())?;
    println!("saved {}", path.display());
    print!("{}", session.log().summary().render());
    Ok(())
}

fn run_card(config: &RehabConfig, stream: &Path, cards: &[String], dt: f32) -> Result<()> {
    let mut session = CardSession::new(config);
    let mut queue = cards.iter().filter_map(|payload| {
        let task = CardTask::from_payload(payload);
        if task.is_none() {
            tracing::warn!(payload = %payload, "not a card");
        }
        task
    });

    for detection in load_stream(stream)? {
        if session.current_task().is_none() && session.flow().is_training() {
            match queue.next() {
                Some(task) => {
                    session.arm(task);
                }
                None => break,
            }
        }
        print_events(&session.tick(detection.frame(), dt));
        if session.is_finished() {
            break;
        }
    }

    println!(
        "{} cards completed, {} rounds counted",
        session.completed().len(),
        session.flow().total_rounds()
    );
    Ok(())
}

/// Templates recorded from synthetic poses, one per difficulty level
fn synthetic_library() -> TemplateLibrary {
    ["1fist", "2palm", "3like", "4one", "5ok"]
        .iter()
        .filter_map(|name| ReferenceTemplate::from_raw(*name, &mimic(name).build().points))
        .collect()
}

/// A synthetic hand performing a catalog gesture as well as it can
fn mimic(name: &str) -> SyntheticHand {
    match GestureClass::from_name(name) {
        GestureClass::Fist => SyntheticHand::fist(),
        GestureClass::Like => SyntheticHand::thumbs_up(),
        GestureClass::Dislike => SyntheticHand::thumbs_down(),
        GestureClass::Ok => SyntheticHand::ok_sign(),
        GestureClass::One | GestureClass::Point => pointing_hand(),
        GestureClass::Peace => SyntheticHand::fist()
            .finger(Finger::Index, Pose::Straight)
            .finger(Finger::Middle, Pose::Straight),
        _ => SyntheticHand::open_palm(),
    }
}

fn pointing_hand() -> SyntheticHand {
    SyntheticHand::fist().finger(Finger::Index, Pose::Straight)
}

/// Hold one hand in front of the menu until a mode is confirmed
fn select_mode(config: &RehabConfig, hand: &LandmarkFrame, max_secs: f32, dt: f32) -> Option<TrainingMode> {
    let mut selector = ModeSelector::new(config.selection.clone());
    let mut elapsed = 0.0;
    while elapsed < max_secs {
        if let Some(mode) = selector.update(Some(hand), dt) {
            println!("selected {} mode", mode.as_str());
            return Some(mode);
        }
        elapsed += dt;
    }
    None
}

fn gesture_hand(gesture: Gesture) -> Option<SyntheticHand> {
    match gesture {
        Gesture::Fist => Some(SyntheticHand::fist()),
        Gesture::Open => Some(SyntheticHand::open_palm()),
        Gesture::Ok => Some(SyntheticHand::ok_sign()),
        Gesture::Unknown => None,
    }
}

/// Card session fed fist, open and OK cards in turn
fn run_card_demo(config: &RehabConfig, max_secs: f32, dt: f32) -> Result<()> {
    let mut session = CardSession::new(config);
    let mut deck = [Gesture::Fist, Gesture::Open, Gesture::Ok].into_iter().cycle().enumerate();
    let thumbs_up = SyntheticHand::thumbs_up().build();

    let mut elapsed = 0.0;
    while !session.is_finished() && elapsed < max_secs {
        if session.current_task().is_none() && session.flow().is_training() {
            if let Some((n, gesture)) = deck.next() {
                let mut task = CardTask::new(gesture);
                task.card_id = format!("demo-{n}");
                session.arm(task);
            }
        }
        let frame = match session.flow().state() {
            SessionState::StateCheck => Some(thumbs_up.clone()),
            SessionState::Training => session
                .current_task()
                .and_then(|task| gesture_hand(task.gesture))
                .map(|hand| hand.build()),
            _ => None,
        };
        print_events(&session.tick(frame.as_ref(), dt));
        elapsed += dt;
    }

    println!(
        "{} cards completed, {} rounds counted",
        session.completed().len(),
        session.flow().total_rounds()
    );
    Ok(())
}

fn run_demo(
    config: &RehabConfig,
    templates: Option<&Path>,
    out: Option<&Path>,
    seed: Option<u64>,
    max_secs: f32,
    dt: f32,
) -> Result<()> {
    let library = match templates {
        Some(dir) => load_template_dir(dir)?,
        None => synthetic_library(),
    };
    let mut session = RandomSession::new(config, library, Local::now().naive_local(), seeded_rng(seed))?;

    let thumbs_up = SyntheticHand::thumbs_up().build();
    let mut elapsed = 0.0;
    while !session.is_finished() && elapsed < max_secs {
        let frame: Option<LandmarkFrame> = match (session.flow().state(), session.phase()) {
            (SessionState::StateCheck, _) | (SessionState::Training, RandomPhase::Attitude) => Some(thumbs_up.clone()),
            (SessionState::Training, RandomPhase::Round) => session.engine().gesture_name().map(|n| mimic(n).build()),
            _ => None,
        };
        print_events(&session.tick(frame.as_ref(), dt));
        elapsed += dt;
    }

    if let Some(dir) = out {
        let path = SessionStore::new(dir).save(session.log())?;
        println!("saved {}", path.display());
    }
    print!("{}", session.log().summary().render());
    Ok(())
}
