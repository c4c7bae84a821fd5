// SPDX-License-Identifier: MIT
//
// Error type for the terminal layer.
//
// Curses-style drivers either succeed or abort the process. Here every
// failure that can actually happen at runtime (termios, ioctl, writes,
// stdin closing under us) comes back as a `TermError` so the reader can
// restore the terminal and report instead of dying in raw mode.

use std::io;

/// Everything that can go wrong in the terminal layer.
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    /// A terminal system call or write to the output failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// `Screen::init` was called while another terminal-backed screen is live.
    #[error("a terminal screen is already active in this process")]
    AlreadyActive,

    /// A color pair index outside the registered palette range.
    #[error("color pair {pair} is outside the palette (1..=64)")]
    PairOutOfRange { pair: u16 },

    /// The input stream reached end-of-file while waiting for a key.
    #[error("terminal input closed")]
    InputClosed,

    /// An environment setting could not be parsed.
    #[error("invalid value {value:?} for {var}")]
    InvalidConfig { var: &'static str, value: String },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TermError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let err: TermError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, TermError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn pair_out_of_range_message_names_pair() {
        let err = TermError::PairOutOfRange { pair: 65 };
        assert_eq!(err.to_string(), "color pair 65 is outside the palette (1..=64)");
    }

    #[test]
    fn invalid_config_message() {
        let err = TermError::InvalidConfig {
            var: "ESCDELAY",
            value: "soon".into(),
        };
        assert_eq!(err.to_string(), "invalid value \"soon\" for ESCDELAY");
    }
}
