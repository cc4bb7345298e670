pub(crate) mod http;
pub(crate) mod types;

pub(crate) use http::ManagementClient;
