// SPDX-License-Identifier: MIT
//
// Terminal control: cbreak mode, signals, alternate screen, RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, sigaction and raw fd writes.
// These are the standard POSIX interfaces for terminal control and there
// is no safe alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// Entering the terminal puts it into cbreak mode (no line buffering, no
// echo, signals still delivered), ignores SIGINT so Ctrl-C cannot kill the
// reader mid-frame, installs a SIGWINCH handler, and turns on keypad mode.
// Everything is undone on leave, on drop, and from the panic hook.
//
// The panic hook bypasses Rust's stdout lock entirely, writing a pre-built
// restore sequence directly to fd 1. This prevents deadlock if the panic
// happened while holding the stdout lock. One raw write, everything
// restored, then the original panic handler prints its message to a
// working terminal.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::config::ScreenConfig;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

impl Size {
    /// Size used when the terminal cannot be queried.
    pub const FALLBACK: Self = Self { rows: 24, cols: 80 };

    #[inline]
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size::new(ws.ws_row, ws.ws_col))
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

/// Set by the SIGWINCH handler, consumed by [`take_resize`].
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

/// Whether a resize was signalled since the last call. Clears the flag.
pub fn take_resize() -> bool {
    RESIZE_PENDING.swap(false, Ordering::Relaxed)
}

// ─── Mode Sequences ─────────────────────────────────────────────────────────

fn write_enter_sequences(out: &mut impl Write, alt_screen: bool) -> io::Result<()> {
    if alt_screen {
        ansi::enter_alt_screen(out)?;
    }
    ansi::keypad_on(out)?;
    out.flush()
}

fn write_leave_sequences(out: &mut impl Write, alt_screen: bool, size: Size) -> io::Result<()> {
    ansi::end_sync(out)?;
    ansi::keypad_off(out)?;
    ansi::reset(out)?;
    ansi::cursor_show(out)?;
    if alt_screen {
        ansi::exit_alt_screen(out)?;
    } else {
        // Leave the prompt below whatever was drawn.
        ansi::cursor_to(out, 0, size.rows.saturating_sub(1))?;
        out.write_all(b"\r\n")?;
    }
    out.flush()
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup lets the hook restore the mode without
/// the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Complete terminal restore sequence for emergency use.
///
/// End synchronized output, leave keypad mode, reset SGR attributes, show
/// the cursor, exit the alternate screen. The alternate screen exit comes
/// last so the restored shell content appears with no artifacts.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?1l\x1b>\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

/// Panic hook guard: the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// [`enter`](Self::enter) switches the tty into the mode a curses program
/// runs in; the terminal is restored when the handle is dropped, even on
/// panic.
pub struct Terminal {
    /// Original termios saved before entering cbreak mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// SIGINT disposition before we started ignoring it.
    #[cfg(unix)]
    old_sigint: Option<libc::sigaction>,

    /// SIGWINCH disposition before our handler.
    #[cfg(unix)]
    old_sigwinch: Option<libc::sigaction>,

    /// Cached size, refreshed with [`refresh_size`](Self::refresh_size).
    size: Size,

    /// Whether the alternate screen was entered.
    alt_screen: bool,

    active: bool,
}

impl Terminal {
    /// Create a terminal handle and query the current size.
    ///
    /// Does **not** touch the terminal mode. Falls back to 80×24 if the size
    /// cannot be determined.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            #[cfg(unix)]
            old_sigint: None,
            #[cfg(unix)]
            old_sigwinch: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            alt_screen: false,
            active: false,
        }
    }

    /// Current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the terminal size from the OS and cache it.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            self.size = s;
        }
        self.size
    }

    /// Enter curses mode: cbreak + noecho, keypad on, SIGWINCH handler,
    /// SIGINT ignored (if configured), alternate screen (if configured).
    ///
    /// Idempotent: calling `enter()` while already active is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or terminal output fails.
    pub fn enter(&mut self, config: &ScreenConfig) -> io::Result<()> {
        self.enter_with(config, &mut io::stdout().lock())
    }

    fn enter_with(&mut self, config: &ScreenConfig, out: &mut impl Write) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_cbreak_mode()?;
        self.install_signal_handlers(config.ignore_interrupt);

        // From here on the tty is modified, so every failure must go
        // through `leave`.
        self.alt_screen = config.alt_screen;
        self.active = true;

        if let Err(err) = write_enter_sequences(out, config.alt_screen) {
            if let Err(restore) = self.leave_with(out) {
                tracing::warn!(error = %restore, "terminal restore after failed enter");
            }
            return Err(err);
        }

        self.refresh_size();
        tracing::debug!(
            rows = self.size.rows,
            cols = self.size.cols,
            alt_screen = self.alt_screen,
            "terminal entered"
        );
        Ok(())
    }

    /// Leave curses mode and restore the terminal.
    ///
    /// Idempotent: calling `leave()` while inactive is a no-op. Signal
    /// dispositions and the tty mode are restored even when writing the
    /// restore sequences fails; the first error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        self.leave_with(&mut io::stdout().lock())
    }

    fn leave_with(&mut self, out: &mut impl Write) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let written = write_leave_sequences(out, self.alt_screen, self.size);
        self.restore_signal_handlers();
        let restored = self.disable_cbreak_mode();

        // A failed tcsetattr keeps the handle active so drop retries it.
        if restored.is_ok() {
            self.active = false;
            self.alt_screen = false;
            tracing::debug!("terminal restored");
        }
        written.and(restored)
    }

    // ── cbreak mode (termios) ───────────────────────────────────────

    #[cfg(unix)]
    fn enable_cbreak_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        let fd = libc::STDIN_FILENO;

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // No line editing, no echo. ISIG stays on so Ctrl-Z suspends;
            // Ctrl-C is handled by the SIGINT disposition. CR arrives
            // untranslated and the input parser maps it to Enter.
            termios.c_iflag &= !(libc::ICRNL | libc::INLCR | libc::IGNCR | libc::IXON);
            termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::IEXTEN);

            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_cbreak_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_cbreak_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_cbreak_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    // ── Signals ─────────────────────────────────────────────────────

    #[cfg(unix)]
    fn install_signal_handlers(&mut self, ignore_interrupt: bool) {
        unsafe {
            let mut sa: libc::sigaction = std::mem::zeroed();
            sa.sa_sigaction = sigwinch_handler as *const () as usize;
            // No SA_RESTART: a resize should wake a blocked poll().
            sa.sa_flags = 0;
            libc::sigemptyset(&raw mut sa.sa_mask);
            let mut old: libc::sigaction = std::mem::zeroed();
            if libc::sigaction(libc::SIGWINCH, &raw const sa, &raw mut old) == 0 {
                self.old_sigwinch = Some(old);
            }

            if ignore_interrupt {
                let mut ign: libc::sigaction = std::mem::zeroed();
                ign.sa_sigaction = libc::SIG_IGN;
                libc::sigemptyset(&raw mut ign.sa_mask);
                let mut old: libc::sigaction = std::mem::zeroed();
                if libc::sigaction(libc::SIGINT, &raw const ign, &raw mut old) == 0 {
                    self.old_sigint = Some(old);
                }
            }
        }
    }

    #[cfg(not(unix))]
    fn install_signal_handlers(&mut self, _ignore_interrupt: bool) {}

    #[cfg(unix)]
    fn restore_signal_handlers(&mut self) {
        unsafe {
            if let Some(old) = self.old_sigint.take() {
                libc::sigaction(libc::SIGINT, &raw const old, std::ptr::null_mut());
            }
            if let Some(old) = self.old_sigwinch.take() {
                libc::sigaction(libc::SIGWINCH, &raw const old, std::ptr::null_mut());
            }
        }
    }

    #[cfg(not(unix))]
    fn restore_signal_handlers(&mut self) {}
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
