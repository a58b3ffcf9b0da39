//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements              | Connects to              |
//! |----------------|-------------------------|--------------------------|
//! | `log_sink`     | TelemetrySink, TextSink | Serial log output        |
//! | `query`        | ParamSource             | Request query string     |
//! | `request`      | (drives ControlSurface) | Raw request URIs         |
//! | `http_server`  | (drives ControlSurface) | ESP-IDF HTTP server      |
//! | `wifi`         | (feeds NetLink)         | ESP-IDF WiFi STA / sim   |

#[cfg(target_os = "espidf")]
pub mod http_server;
pub mod log_sink;
pub mod query;
pub mod request;
pub mod wifi;
