use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Watches the terminal for `q` or Ctrl-C and fires a callback once.
///
/// Raw mode is held only while the handle is alive.
pub struct InputHandle {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl InputHandle {
    pub fn start<F>(on_interrupt: F) -> anyhow::Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        enable_raw_mode()?;
        let stop: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
        let stop_ref = stop.clone();

        let worker = thread::spawn(move || {
            let mut on_interrupt = Some(on_interrupt);
            while !stop_ref.load(Ordering::Relaxed) {
                if !event::poll(POLL_INTERVAL).unwrap_or(false) {
                    continue;
                }
                if let Ok(Event::Key(key_event)) = event::read() {
                    let is_q = key_event.code == KeyCode::Char('q');
                    let is_ctrl_c = key_event.code == KeyCode::Char('c')
                        && key_event.modifiers.contains(KeyModifiers::CONTROL);

                    if (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press {
                        if let Some(callback) = on_interrupt.take() {
                            callback();
                        }
                        break;
                    }
                }
            }
            let _ = disable_raw_mode();
        });

        Ok(Self {
            stop,
            worker: Some(worker),
        })
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        let _ = disable_raw_mode();
    }
}
