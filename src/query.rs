/// Default TSI Gen2 data-plane API version
pub const DEFAULT_API_VERSION: &str = "2020-07-31";

/// Supplies the query parameters shared by every TSI call
pub trait QueryStringBuilder: Send + Sync {
    fn query_string(&self) -> Vec<(String, String)>;
}

/// Query string carrying only `api-version`
#[derive(Debug, Clone)]
pub struct ApiVersion {
    version: String,
}

impl ApiVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(DEFAULT_API_VERSION)
    }
}

impl QueryStringBuilder for ApiVersion {
    fn query_string(&self) -> Vec<(String, String)> {
        vec![("api-version".to_string(), self.version.clone())]
    }
}
