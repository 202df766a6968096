mod api_server;
mod client_ip;
mod query_target;
mod text;

pub use api_server::{router, ApiServer, ApiState};
pub use client_ip::client_ip;
pub use query_target::{is_special, TargetError, TargetPolicy, RESERVED_SUFFIXES};
pub use text::{format_utc_offset, render_failure, render_success};
