//! Server-side include expansion for the embedded pages.
//!
//! Every `<!--#name-->` in a template is replaced by the rendered status tag
//! of that name.  Each insert is rendered into a fixed buffer, so a tag can
//! never produce more than [`INSERT_CAPACITY`] bytes.

use super::control::{ControlSurface, View};
use super::ports::TextSink;

/// Maximum bytes one tag may contribute to a page.
pub const INSERT_CAPACITY: usize = 192;

const TAG_OPEN: &str = "<!--#";
const TAG_CLOSE: &str = "-->";

pub const IO_CONTROL_PAGE: &str = include_str!("../../web/io_cgi.ssi");
pub const PARAM_ERROR_PAGE: &str = include_str!("../../web/perror.htm");

/// Template behind a view.
pub const fn template(view: View) -> &'static str {
    match view {
        View::Default => IO_CONTROL_PAGE,
        View::ParamError => PARAM_ERROR_PAGE,
    }
}

/// Expand every include in `template` using `render(name, buf) -> len`.
pub fn expand_with(template: &str, mut render: impl FnMut(&str, &mut [u8]) -> usize) -> String {
    let mut page = String::with_capacity(template.len() + INSERT_CAPACITY);
    let mut insert = [0u8; INSERT_CAPACITY];
    let mut rest = template;

    while let Some(start) = rest.find(TAG_OPEN) {
        let after_open = &rest[start + TAG_OPEN.len()..];
        let Some(end) = after_open.find(TAG_CLOSE) else {
            break;
        };
        page.push_str(&rest[..start]);

        let name = &after_open[..end];
        let n = render(name, &mut insert).min(INSERT_CAPACITY);
        // Renderers only cut at character boundaries.
        page.push_str(core::str::from_utf8(&insert[..n]).unwrap_or_default());

        rest = &after_open[end + TAG_CLOSE.len()..];
    }
    page.push_str(rest);
    page
}

/// Expand `template` against the current station state.
pub fn expand<T: TextSink>(template: &str, surface: &ControlSurface<'_, T>) -> String {
    expand_with(template, |name, buf| surface.render_named(name, buf))
}

/// The full response page for `view`.
pub fn render_view<T: TextSink>(view: View, surface: &ControlSurface<'_, T>) -> String {
    expand(template(view), surface)
}
