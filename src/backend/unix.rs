//! Unix terminal backend
//!
//! Drives a real terminal through stdin/stdout. Creation switches the
//! terminal into cbreak/no-echo mode (one byte per read, no line buffering)
//! and `Drop` restores the saved termios state, so any unwinding exit path
//! leaves the user's terminal usable.
//!
//! The wire sends special keys as ANSI escape sequences. This backend
//! normalizes them into single extended key codes above the character range
//! (the keypad convention), so it speaks [`DecodeScheme::ExtendedCode`]: the
//! core decoder sees exactly one raw unit per keypress.

use std::io::{self, Write};
use std::os::fd::{AsFd, AsRawFd};

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};
use nix::unistd::read;

use super::{DecodeScheme, RawUnit, TerminalBackend, Viewport};
use crate::error::{Error, Result};

/// How long to wait for a byte after ESC before treating it as a lone
/// Escape keypress (the wire is ambiguous; this mirrors curses' ESCDELAY).
const ESCAPE_DISAMBIGUATION_MS: u8 = 25;

/// Extended code reported for escape sequences with no table entry. Above
/// the character range but absent from the decoder's lookup table, so the
/// decoder surfaces it as an unknown key sequence.
const UNRECOGNIZED_SEQUENCE: RawUnit = 0xFFFF;

/// Terminal backend over stdin/stdout with scoped raw-mode acquisition
pub struct UnixBackend {
    saved: Termios,
    fixed_viewport: Option<Viewport>,
}

impl UnixBackend {
    /// Switch the controlling terminal to cbreak/no-echo mode and hide the
    /// cursor. The previous mode is restored when the backend is dropped.
    pub fn new() -> Result<Self> {
        let stdin = io::stdin();
        let saved = termios::tcgetattr(stdin.as_fd())?;

        let mut raw = saved.clone();
        raw.local_flags &=
            !(LocalFlags::ECHO | LocalFlags::ECHONL | LocalFlags::ICANON | LocalFlags::IEXTEN);
        raw.input_flags &=
            !(termios::InputFlags::ICRNL | termios::InputFlags::IXON);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &raw)?;

        let mut out = io::stdout().lock();
        out.write_all(b"\x1b[?25l\x1b[H\x1b[2J")?;
        out.flush()?;

        tracing::debug!("entered cbreak mode");
        Ok(Self {
            saved,
            fixed_viewport: None,
        })
    }

    /// Clip to a fixed viewport instead of the reported window size.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.fixed_viewport = Some(viewport);
        self
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        let n = read(io::stdin().as_raw_fd(), &mut buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed").into());
        }
        Ok(buf[0])
    }

    /// True if a byte is already waiting on stdin.
    fn byte_pending(&self, timeout_ms: u8) -> Result<bool> {
        let stdin = io::stdin();
        let mut fds = [PollFd::new(stdin.as_fd(), PollFlags::POLLIN)];
        let n = poll(&mut fds, PollTimeout::from(timeout_ms))?;
        Ok(n > 0
            && fds[0]
                .revents()
                .is_some_and(|r| r.contains(PollFlags::POLLIN)))
    }

    /// Finish reading a UTF-8 encoded character whose lead byte was `lead`.
    fn read_utf8_tail(&mut self, lead: u8) -> Result<RawUnit> {
        let len = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(Error::Decode { unit: lead.into() }),
        };
        let mut bytes = vec![lead];
        for _ in 1..len {
            bytes.push(self.read_byte()?);
        }
        let s = std::str::from_utf8(&bytes).map_err(|_| Error::Decode { unit: lead.into() })?;
        // A correct UTF-8 sequence of this length is exactly one char.
        let c = s.chars().next().ok_or(Error::Decode { unit: lead.into() })?;
        Ok(c as RawUnit)
    }

    /// Translate the escape sequence following an ESC byte into one
    /// extended key code.
    fn read_escape_sequence(&mut self) -> Result<RawUnit> {
        let introducer = self.read_byte()?;
        match introducer {
            b'[' => self.read_csi(),
            b'O' => {
                // SS3 sequences: one final byte
                let code = match self.read_byte()? {
                    b'A' => 259,
                    b'B' => 258,
                    b'C' => 261,
                    b'D' => 260,
                    b'H' => 262,
                    b'F' => 360,
                    b'P' => 265,
                    b'Q' => 266,
                    b'R' => 267,
                    b'S' => 268,
                    _ => UNRECOGNIZED_SEQUENCE,
                };
                Ok(code)
            }
            _ => Ok(UNRECOGNIZED_SEQUENCE),
        }
    }

    /// CSI sequences: parameter bytes, then one final byte in 0x40..=0x7E.
    fn read_csi(&mut self) -> Result<RawUnit> {
        let mut params = Vec::new();
        let final_byte = loop {
            let b = self.read_byte()?;
            if (0x40..=0x7E).contains(&b) {
                break b;
            }
            params.push(b);
        };
        let code = match final_byte {
            b'A' => 259,
            b'B' => 258,
            b'C' => 261,
            b'D' => 260,
            b'H' => 262,
            b'F' => 360,
            b'~' => match params.as_slice() {
                b"1" | b"7" => 262,
                b"4" | b"8" => 360,
                b"2" => 331,
                b"3" => 330,
                b"5" => 339,
                b"6" => 338,
                b"11" => 265,
                b"12" => 266,
                b"13" => 267,
                b"14" => 268,
                b"15" => 269,
                b"17" => 270,
                b"18" => 271,
                b"19" => 272,
                b"20" => 273,
                b"21" => 274,
                b"23" => 275,
                b"24" => 276,
                _ => UNRECOGNIZED_SEQUENCE,
            },
            _ => UNRECOGNIZED_SEQUENCE,
        };
        Ok(code)
    }
}

impl TerminalBackend for UnixBackend {
    fn scheme(&self) -> DecodeScheme {
        DecodeScheme::ExtendedCode
    }

    fn read_unit(&mut self) -> Result<RawUnit> {
        let byte = self.read_byte()?;
        match byte {
            // ESC: either a lone Escape keypress or the start of a sequence
            0x1b => {
                if self.byte_pending(ESCAPE_DISAMBIGUATION_MS)? {
                    self.read_escape_sequence()
                } else {
                    Ok(0x1b)
                }
            }
            0x00..=0x7f => Ok(byte.into()),
            _ => self.read_utf8_tail(byte),
        }
    }

    fn size(&self) -> Option<Viewport> {
        if self.fixed_viewport.is_some() {
            return self.fixed_viewport;
        }
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let result =
            unsafe { libc::ioctl(io::stdout().as_raw_fd(), libc::TIOCGWINSZ as libc::c_ulong, &mut ws) };
        if result < 0 || ws.ws_col == 0 || ws.ws_row == 0 {
            return None;
        }
        Some(Viewport::from(ws))
    }

    fn paint(&mut self, text: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        // Home the cursor, rewrite each line erasing its remainder, then
        // erase everything below the last line.
        out.write_all(b"\x1b[H")?;
        let mut first = true;
        for line in text.split('\n') {
            if !first {
                out.write_all(b"\r\n")?;
            }
            out.write_all(line.as_bytes())?;
            out.write_all(b"\x1b[K")?;
            first = false;
        }
        out.write_all(b"\x1b[J")?;
        out.flush()?;
        Ok(())
    }
}

impl Drop for UnixBackend {
    fn drop(&mut self) {
        let stdin = io::stdin();
        if let Err(e) = termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &self.saved) {
            tracing::warn!("failed to restore terminal mode: {e}");
        }
        let mut out = io::stdout().lock();
        let _ = out.write_all(b"\x1b[?25h");
        let _ = out.flush();
    }
}
