use crate::{display::TextDisplay, Error, Result};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Install a ctrl-c/SIGTERM handler that clears the running flag so the loop can
/// leave the display in a known state.
pub(super) fn create_shutdown_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let running_handle = running.clone();

    ctrlc::set_handler(move || {
        running_handle.store(false, Ordering::SeqCst);
    })
    .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

    Ok(running)
}

pub(super) fn render_boot(display: &mut impl TextDisplay) -> Result<()> {
    display.show_lines("Klipper Monitor", "Starting...")
}

pub(super) fn render_shutdown(display: &mut impl TextDisplay) -> Result<()> {
    display.show_lines("offline", "")
}
