use crate::{
    apis::HierarchyApi,
    auth::{self, TokenProvider},
    config::{TsiConfig, DEFAULT_TIMEOUT},
    error::{TsiError, TsiResult},
    models::ErrorResponse,
    query::{ApiVersion, QueryStringBuilder},
};
use bytes::Bytes;
use log::{debug, error, info};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{sync::Arc, time::Duration};
use url::Url;

pub const APPLICATION_NAME_HEADER: &str = "x-ms-client-application-name";
pub const CONTINUATION_HEADER: &str = "x-ms-continuation";

/// Main TSI client
#[derive(Clone)]
pub struct TsiClient {
    client: Client,
    base_url: Url,
    environment_id: String,
    application_name: String,
    application_header: HeaderValue,
    auth: Arc<dyn TokenProvider>,
    query: Arc<dyn QueryStringBuilder>,
    timeout: Duration,
}

impl TsiClient {
    /// Create a client for the given environment
    ///
    /// # Arguments
    /// * `environment_id` - TSI environment id, forms the host name
    /// * `application_name` - Sent as `x-ms-client-application-name`
    /// * `auth` - Token provider consulted once per operation
    /// * `query` - Common query parameters (usually just `api-version`)
    pub fn new(
        environment_id: impl Into<String>,
        application_name: impl Into<String>,
        auth: impl TokenProvider + 'static,
        query: impl QueryStringBuilder + 'static,
    ) -> TsiResult<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Self::with_client(client, environment_id, application_name, auth, query)
    }

    /// Create a TSI client with custom reqwest client
    pub fn with_client(
        client: Client,
        environment_id: impl Into<String>,
        application_name: impl Into<String>,
        auth: impl TokenProvider + 'static,
        query: impl QueryStringBuilder + 'static,
    ) -> TsiResult<Self> {
        let environment_id = environment_id.into();
        let application_name = application_name.into();

        if environment_id.is_empty()
            || !environment_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(TsiError::invalid_param(format!(
                "invalid environment id: {:?}",
                environment_id
            )));
        }
        let application_header = HeaderValue::from_str(&application_name).map_err(|_| {
            TsiError::invalid_param(format!("invalid application name: {:?}", application_name))
        })?;

        let base_url = Url::parse(&format!(
            "https://{}.env.timeseries.azure.com/",
            environment_id
        ))?;

        Ok(Self {
            client,
            base_url,
            environment_id,
            application_name,
            application_header,
            auth: Arc::new(auth),
            query: Arc::new(query),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Create a client from loaded settings
    pub fn from_config(config: &TsiConfig, auth: impl TokenProvider + 'static) -> TsiResult<Self> {
        Ok(Self::new(
            config.environment_id.as_str(),
            config.application_name.as_str(),
            auth,
            ApiVersion::new(config.api_version.as_str()),
        )?
        .with_timeout(config.timeout))
    }

    /// Point the client at another host (sovereign clouds, proxies, tests)
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> TsiResult<Self> {
        let mut url = Url::parse(base_url.as_ref())?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    /// Timeout applied to every request, pagination included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn environment_id(&self) -> &str {
        &self.environment_id
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get Hierarchy API
    pub fn hierarchies(&self) -> HierarchyApi<'_> {
        HierarchyApi::new(self)
    }

    /// Resolve a path relative to the base URL
    pub fn url(&self, path: &str) -> TsiResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Headers shared by every call of one operation, token included
    pub async fn headers(&self) -> TsiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        auth::apply_token(self.auth.as_ref(), &mut headers).await?;

        headers.insert(
            HeaderName::from_static(APPLICATION_NAME_HEADER),
            self.application_header.clone(),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        Ok(headers)
    }

    /// Build a request to the given path with the common headers,
    /// query string and timeout
    pub fn request(
        &self,
        method: Method,
        path: &str,
        headers: &HeaderMap,
    ) -> TsiResult<RequestBuilder> {
        let url = self.url(path)?;

        Ok(self
            .client
            .request(method, url)
            .headers(headers.clone())
            .query(&self.query.query_string())
            .timeout(self.timeout))
    }

    /// Send a request and return the body of a successful response
    pub async fn execute_bytes(&self, request: RequestBuilder) -> TsiResult<Bytes> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        self.handle_response_bytes(response).await
    }

    /// Send a request and parse the JSON body; `None` for an empty body
    pub async fn execute<T>(&self, request: RequestBuilder) -> TsiResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let body = self.execute_bytes(request).await?;
        parse_body(&body)
    }

    /// Post a payload to `/timeseries/{resource}/$batch`
    ///
    /// # Arguments
    /// * `payload` - Any JSON-serializable batch body, passed through as is
    /// * `resource` - Target collection, e.g. `hierarchies`
    pub async fn update_time_series<P>(
        &self,
        payload: &P,
        resource: &str,
    ) -> TsiResult<Option<serde_json::Value>>
    where
        P: Serialize + ?Sized,
    {
        self.batch(payload, resource).await
    }

    pub(crate) async fn batch<P, T>(&self, payload: &P, resource: &str) -> TsiResult<Option<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if matches!(resource, "" | "." | "..") {
            return Err(TsiError::invalid_param(format!(
                "invalid resource name: {:?}",
                resource
            )));
        }
        info!("Writing {} batch to environment: {}", resource, self.environment_id);

        let body = serde_json::to_vec(payload)?;
        let headers = self.headers().await?;
        let path = format!("timeseries/{}/$batch", urlencoding::encode(resource));
        let req = self.request(Method::POST, &path, &headers)?.body(body);
        debug!("HTTP POST /{}", path);

        self.execute(req).await
    }

    fn transport_error(&self, err: reqwest::Error) -> TsiError {
        let err = TsiError::from_transport(err);
        if err.is_connectivity() {
            error!("TSIClient: The request to the TSI api timed out or could not connect: {}", err);
        }
        err
    }

    /// Handle response and return raw bytes
    async fn handle_response_bytes(&self, response: Response) -> TsiResult<Bytes> {
        let status = response.status();

        if status.is_success() {
            response.bytes().await.map_err(|e| self.transport_error(e))
        } else {
            self.handle_error_response(status, response).await
        }
    }

    /// Handle error responses
    async fn handle_error_response<T>(&self, status: StatusCode, response: Response) -> TsiResult<T> {
        let error_message = match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse { error: Some(body) }) => match (body.code, body.message) {
                (Some(code), Some(message)) => format!("{}: {}", code, message),
                (None, Some(message)) => message,
                (Some(code), None) => code,
                (None, None) => format!("HTTP {}", status),
            },
            _ => format!("HTTP {}", status),
        };

        error!(
            "TSIClient: The request to the TSI api returned an unsuccessful status code {}: {}",
            status.as_u16(),
            error_message
        );
        Err(TsiError::api_error(status.as_u16(), error_message))
    }
}

/// Parse a JSON body, treating an empty (or blank) body as no result
pub(crate) fn parse_body<T>(body: &[u8]) -> TsiResult<Option<T>>
where
    T: DeserializeOwned,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}
