use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use crate::app::{App, AppEvent};

/// How long to wait for input before draining worker results again.
pub const TICK_RATE: Duration = Duration::from_millis(250);

/// Waits up to `timeout` for a key press. Anything else becomes a tick.
pub fn poll(timeout: Duration) -> Result<AppEvent> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(AppEvent::KeyPress(key.code));
            }
        }
    }
    Ok(AppEvent::Tick)
}

/// Draws, waits for input, and feeds the app until it stops running.
pub fn run(app: &mut App, terminal: &mut crate::tui::Terminal) -> Result<()> {
    while app.running {
        terminal.draw(|frame| crate::ui::draw(frame, app))?;
        let event = poll(TICK_RATE)?;
        app.update(event);
    }
    Ok(())
}
