mod dashmap_query_cache;
mod http_json;
mod ip_api_com;
mod ipapi_co;
mod ipinfo_free;
mod registry;

pub use dashmap_query_cache::{DashMapQueryCache, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
pub use http_json::build_http_client;
pub use ip_api_com::IpApiComClient;
pub use ipapi_co::IpapiCoClient;
pub use ipinfo_free::IpinfoFreeClient;
pub use registry::{UpstreamClient, UpstreamEndpoints, UpstreamRegistry};
