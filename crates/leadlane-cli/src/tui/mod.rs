//! Full-screen terminal dashboard.
//!
//! Two tabs over the same lead store — the filterable table and the
//! three-column board — plus modal create/edit forms and a login screen.
//! The change feed is drained between input events on the single UI
//! thread, so every frame renders a projection of the freshest store
//! state. Scripted background actors (when enabled) commit against the
//! backend from a separate thread, arriving here only through the feed.

pub mod app;
pub mod board;
pub mod dialog;
pub mod login;
pub mod table;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use leadlane_sim::{ActorPool, DeterministicRng};

use crate::demo::DemoEnv;
use app::App;

/// Poll cadence for input and feed draining.
const TICK: Duration = Duration::from_millis(120);

/// Run the dashboard until the user quits.
pub fn run_tui(env: &DemoEnv, seed: u64) -> Result<()> {
    let mut app = App::new(env)?;

    let stop = Arc::new(AtomicBool::new(false));
    let actor_handle = if env.config.demo.live_actors {
        let backend = env.backend.clone();
        let stop = stop.clone();
        Some(std::thread::spawn(move || {
            let mut pool = ActorPool::new(DeterministicRng::new(seed ^ 0xACE5));
            while !stop.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(1400));
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                pool.run_round(&backend, 1);
            }
        }))
    } else {
        None
    };

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app);
    ratatui::restore();

    stop.store(true, Ordering::Relaxed);
    if let Some(handle) = actor_handle {
        let _ = handle.join();
    }
    result
}

fn event_loop(terminal: &mut ratatui::DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        app.drain_feed();
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
