//! URI routing for transports that hand over a raw request line.
//!
//! Commands run their handler and respond with the selected view; page URIs
//! respond with their view directly.

use super::query::QueryParams;
use crate::app::control::{ControlSurface, Endpoint, View};
use crate::app::ports::TextSink;
use crate::app::ssi;

/// Which view a request URI resolves to, running the command if it is one.
/// `None` for URIs the station does not serve.
pub fn route<T: TextSink>(surface: &mut ControlSurface<'_, T>, uri: &str) -> Option<View> {
    if let Some(endpoint) = Endpoint::from_uri(uri) {
        return Some(surface.dispatch(endpoint, &QueryParams::new(uri)));
    }
    match uri.split('?').next().unwrap_or(uri) {
        "/" | "/index.htm" => Some(View::Default),
        path => View::from_uri(path),
    }
}

/// Route `uri` and render the resulting page.
pub fn respond<T: TextSink>(surface: &mut ControlSurface<'_, T>, uri: &str) -> Option<String> {
    let view = route(surface, uri)?;
    Some(ssi::render_view(view, surface))
}
