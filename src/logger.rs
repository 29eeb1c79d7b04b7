//! Terminal logging with colored module prefixes and a progress line.
//!
//! - `log!` prints `[module] message`, truncated to the terminal width
//! - `Progress` keeps one in-place bar at the bottom of the output while
//!   the static export renders pages
//!
//! # Example
//!
//! ```ignore
//! log!("store"; "fetched {} posts", posts.len());
//!
//! let progress = Progress::new("pages", routes.len());
//! for route in &routes {
//!     // ...
//!     progress.inc();
//! }
//! progress.finish();
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{Write, stdout},
    sync::{
        Mutex, OnceLock,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Whether a progress line currently occupies the last terminal row
static BAR_ACTIVE: AtomicBool = AtomicBool::new(false);

// Progress line format: "[pages] [████░░░░] 42/100"

/// "[" + "]" + trailing space
const PREFIX_OVERHEAD: usize = 3;
/// " []" around the bar plus the space before the count
const BAR_OVERHEAD: usize = 4;
const MIN_BAR_WIDTH: usize = 10;
const MAX_BAR_WIDTH: usize = 40;

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120)) as usize
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Print one log line, keeping an active progress line below it.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();

    let bar_active = BAR_ACTIVE.load(Ordering::SeqCst);
    if bar_active {
        execute!(stdout, cursor::MoveUp(1)).ok();
    }
    execute!(stdout, Clear(ClearType::FromCursorDown)).ok();

    if message.contains('\n') {
        // Multi-line output (error chains) is never truncated
        writeln!(stdout, "{prefix} {message}").ok();
    } else {
        let max_len = terminal_width().saturating_sub(module.len() + PREFIX_OVERHEAD);
        writeln!(stdout, "{prefix} {}", truncate_str(message, max_len)).ok();
    }

    if bar_active {
        writeln!(stdout).ok();
    }
    stdout.flush().ok();
}

// ============================================================================
// Progress
// ============================================================================

/// A single progress line, redrawn in place.
///
/// Safe to advance from several threads; drawing is serialized.
pub struct Progress {
    prefix: ColoredString,
    prefix_len: usize,
    total: usize,
    current: AtomicUsize,
    lock: Mutex<()>,
}

impl Progress {
    /// Reserve a terminal line for a bar counting up to `total`.
    pub fn new(module: &str, total: usize) -> Self {
        let mut stdout = stdout().lock();
        writeln!(stdout).ok();
        stdout.flush().ok();
        BAR_ACTIVE.store(true, Ordering::SeqCst);

        Self {
            prefix: colorize_prefix(module),
            prefix_len: module.len() + PREFIX_OVERHEAD,
            total,
            current: AtomicUsize::new(0),
            lock: Mutex::new(()),
        }
    }

    /// Advance by one and redraw.
    pub fn inc(&self) {
        let current = self.current.fetch_add(1, Ordering::Relaxed) + 1;
        self.draw(current);
    }

    fn draw(&self, current: usize) {
        let _guard = self.lock.lock().ok();

        let count = format!("{current}/{}", self.total);
        let available = terminal_width()
            .saturating_sub(self.prefix_len + BAR_OVERHEAD + count.len());
        let (filled, empty) = bar_cells(current, self.total, available);
        let bar = "█".repeat(filled) + &"░".repeat(empty);

        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveUp(1), Clear(ClearType::CurrentLine)).ok();
        writeln!(stdout, "{} [{bar}] {count}", self.prefix).ok();
        stdout.flush().ok();
    }

    /// Remove the progress line.
    pub fn finish(&self) {
        if !BAR_ACTIVE.swap(false, Ordering::SeqCst) {
            return;
        }
        let _guard = self.lock.lock().ok();
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveUp(1), Clear(ClearType::CurrentLine)).ok();
        stdout.flush().ok();
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Split the available width into filled and empty bar cells.
fn bar_cells(current: usize, total: usize, available: usize) -> (usize, usize) {
    let width = available.clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH);
    let filled = if total > 0 {
        (current.min(total) * width) / total
    } else {
        0
    };
    (filled, width - filled)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Apply color to a module prefix based on module type.
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" => prefix.bright_blue().bold(),
        "store" => prefix.bright_cyan().bold(),
        "error" => prefix.bright_red().bold(),
        "warn" => prefix.bright_magenta().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
