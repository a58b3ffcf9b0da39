//! ESP-IDF HTTP server adapter.
//!
//! Serves the two view pages and routes every command endpoint through
//! [`ControlSurface::dispatch`].  A command responds with the page of the
//! view its handler selected.
//!
//! ```text
//!   GET /                 ─▶ io_cgi.ssi (expanded)
//!   GET /io_cgi.ssi       ─▶ io_cgi.ssi (expanded)
//!   GET /perror.htm       ─▶ perror.htm
//!   GET /iocontrol.cgi?.. ─▶ dispatch ─▶ selected view
//!   GET /settxt.cgi?..    ─▶ dispatch ─▶ selected view
//! ```

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use esp_idf_svc::http::Method;
use esp_idf_svc::http::server::{Configuration as HttpConfiguration, EspHttpServer};
use esp_idf_svc::io::Write;
use log::info;

use super::query::QueryParams;
use crate::app::control::{ControlSurface, Endpoint, View};
use crate::app::ports::TextSink;
use crate::app::ssi;

type Shared<T> = Arc<Mutex<ControlSurface<'static, T>>>;

fn page<T: TextSink>(surface: &Shared<T>, view: View) -> anyhow::Result<String> {
    let surface = surface
        .lock()
        .map_err(|_| anyhow!("control surface lock poisoned"))?;
    Ok(ssi::render_view(view, &surface))
}

/// Start the server on `port`.  The returned handle must be kept alive.
pub fn start<T>(surface: ControlSurface<'static, T>, port: u16) -> anyhow::Result<EspHttpServer<'static>>
where
    T: TextSink + Send + 'static,
{
    let conf = HttpConfiguration {
        http_port: port,
        stack_size: 16 * 1024,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&conf)?;
    let surface: Shared<T> = Arc::new(Mutex::new(surface));

    for (path, view) in [
        ("/", View::Default),
        (View::Default.uri(), View::Default),
        (View::ParamError.uri(), View::ParamError),
    ] {
        let surface = Arc::clone(&surface);
        server.fn_handler::<anyhow::Error, _>(path, Method::Get, move |req| {
            let body = page(&surface, view)?;
            req.into_ok_response()?.write_all(body.as_bytes())?;
            Ok(())
        })?;
    }

    for endpoint in Endpoint::ALL {
        let surface = Arc::clone(&surface);
        server.fn_handler::<anyhow::Error, _>(endpoint.uri(), Method::Get, move |req| {
            let uri = req.uri().to_string();
            let view = surface
                .lock()
                .map_err(|_| anyhow!("control surface lock poisoned"))?
                .dispatch(endpoint, &QueryParams::new(&uri));
            let body = page(&surface, view)?;
            req.into_ok_response()?.write_all(body.as_bytes())?;
            Ok(())
        })?;
    }

    info!("HTTP server listening on port {}", port);
    Ok(server)
}
