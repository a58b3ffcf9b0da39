//! Status tags: the values a page template can pull from the station.
//!
//! | Index | Name       | Renders                                        |
//! |-------|------------|------------------------------------------------|
//! | 0     | `LEDtxt`   | `ON` / `OFF`                                   |
//! | 1     | `FormVars` | script block with `ls=<0|1>;` and `sp=<n>;`    |
//! | 2     | `speed`    | `<n>%`                                         |
//! | other | —          | `??`                                           |
//!
//! All output goes through `BoundedWriter`, which truncates at the caller's
//! buffer length.

use core::fmt::{self, Write};

use log::debug;

use crate::shared::ActuatorState;

pub const FORM_VARS_HEADER: &str = "<script type='text/javascript' language='JavaScript'><!--\n";
pub const FORM_VARS_FOOTER: &str = "//--></script>\n";
pub const UNKNOWN_TAG: &str = "??";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    LedState,
    FormVars,
    Speed,
}

impl Tag {
    /// Tags in index order.
    pub const ALL: [Tag; 3] = [Tag::LedState, Tag::FormVars, Tag::Speed];

    pub const fn name(self) -> &'static str {
        match self {
            Self::LedState => "LEDtxt",
            Self::FormVars => "FormVars",
            Self::Speed => "speed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    fn write_to(self, state: ActuatorState, out: &mut BoundedWriter<'_>) -> fmt::Result {
        match self {
            Self::LedState => out.write_str(if state.led_on { "ON" } else { "OFF" }),
            Self::FormVars => {
                out.write_str(FORM_VARS_HEADER)?;
                write!(out, "ls={};\nsp={};\n", u8::from(state.led_on), state.speed.get())?;
                out.write_str(FORM_VARS_FOOTER)
            }
            Self::Speed => write!(out, "{}%", state.speed.get()),
        }
    }
}

/// Render `tag` (or the unknown-tag placeholder) into `buf`.
/// Returns the number of bytes written, never more than `buf.len()`.
pub fn render(tag: Option<Tag>, state: ActuatorState, buf: &mut [u8]) -> usize {
    let mut out = BoundedWriter::new(buf);
    let written = match tag {
        Some(tag) => tag.write_to(state, &mut out),
        None => out.write_str(UNKNOWN_TAG),
    };
    // BoundedWriter truncates instead of failing.
    debug_assert!(written.is_ok());
    if out.is_truncated() {
        debug!("Tag {:?} cut to {} bytes: {:?}", tag.map(Tag::name), out.len(), out.as_str());
    }
    out.len()
}

// ───────────────────────────────────────────────────────────────
// Bounded writer
// ───────────────────────────────────────────────────────────────

/// `fmt::Write` over a fixed byte slice that drops whatever does not fit,
/// cutting only at character boundaries.
pub(crate) struct BoundedWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
    truncated: bool,
}

impl<'a> BoundedWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            len: 0,
            truncated: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub(crate) fn as_str(&self) -> &str {
        // Only whole `str` prefixes are ever copied in.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
}

impl Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.len;
        let mut n = s.len().min(room);
        while !s.is_char_boundary(n) {
            n -= 1;
        }
        if n < s.len() {
            self.truncated = true;
        }
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}
