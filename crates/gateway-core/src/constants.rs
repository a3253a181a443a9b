/// Route and claim constants shared across crates.
///
/// The subject identifier key is the same for route values and query
/// parameters; authorization handlers resolve it from either location
/// depending on the requirement's lookup method.
pub const RESOURCE_IDENTIFIER_KEY: &str = "hdid";

/// OAuth scope prefixes distinguishing delegation audiences.
pub mod scope_prefix {
    pub const SYSTEM: &str = "system";
    pub const USER: &str = "user";
}

pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_VERSION_COMPONENT: &str = "v1";
