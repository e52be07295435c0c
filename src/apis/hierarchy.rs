use crate::{
    client::{TsiClient, CONTINUATION_HEADER},
    error::{TsiError, TsiResult},
    models::{
        HierarchiesRequestBatchGetDelete, Hierarchy, HierarchyBatchRequest,
        HierarchyBatchResponse, HierarchyListResult, HierarchyPage,
    },
};
use log::{debug, info};
use reqwest::{header::HeaderValue, Method, RequestBuilder};
use serde::Serialize;

const HIERARCHIES_PATH: &str = "timeseries/hierarchies";
const RESOURCE: &str = "hierarchies";

/// Hierarchy API operations
pub struct HierarchyApi<'a> {
    client: &'a TsiClient,
}

impl<'a> HierarchyApi<'a> {
    pub fn new(client: &'a TsiClient) -> Self {
        Self { client }
    }

    /// Get all hierarchies of the environment
    ///
    /// Follows `continuationToken` until the service stops returning one and
    /// concatenates the pages in the order received. Other top-level keys of
    /// the first page are kept; the returned result carries no continuation
    /// token. An empty token, or one equal to the token just sent, is a
    /// malformed response.
    pub async fn list_hierarchies(&self) -> TsiResult<HierarchyListResult> {
        info!("Listing hierarchies in environment: {}", self.client.environment_id());
        let headers = self.client.headers().await?;

        let req = self.client.request(Method::GET, HIERARCHIES_PATH, &headers)?;
        debug!("HTTP GET /{}", HIERARCHIES_PATH);
        let mut result = self.fetch_page(req).await?;

        let mut next = result.continuation_token.take();
        let mut sent: Option<String> = None;
        let mut pages = 1usize;

        while let Some(token) = next.take() {
            if token.is_empty() {
                return Err(TsiError::malformed("empty continuation token"));
            }
            if sent.as_deref() == Some(token.as_str()) {
                return Err(TsiError::malformed(format!(
                    "continuation token repeated after page {}: {:?}",
                    pages, token
                )));
            }
            let value = HeaderValue::from_str(&token).map_err(|_| {
                TsiError::malformed(format!("continuation token is not a valid header value: {:?}", token))
            })?;
            let req = self
                .client
                .request(Method::GET, HIERARCHIES_PATH, &headers)?
                .header(CONTINUATION_HEADER, value);
            pages += 1;
            debug!("HTTP GET /{} (page {})", HIERARCHIES_PATH, pages);

            let page = self.fetch_page(req).await?;
            result.hierarchies.extend(page.hierarchies);
            next = page.continuation_token;
            sent = Some(token);
        }

        debug!(
            "Fetched {} hierarchies in {} page(s)",
            result.hierarchies.len(),
            pages
        );
        Ok(result)
    }

    /// Create, update, get or delete hierarchies in one batch call
    ///
    /// # Arguments
    /// * `payload` - Batch body as defined by the TSI service; not validated
    ///
    /// Returns the parsed response, or `None` if the service sent no body.
    pub async fn write_hierarchies<P>(&self, payload: &P) -> TsiResult<Option<serde_json::Value>>
    where
        P: Serialize + ?Sized,
    {
        self.client.update_time_series(payload, RESOURCE).await
    }

    /// Create or replace hierarchies
    ///
    /// # Arguments
    /// * `hierarchies` - Definitions to put; ids are assigned by the service when absent
    pub async fn put_hierarchies(
        &self,
        hierarchies: Vec<Hierarchy>,
    ) -> TsiResult<HierarchyBatchResponse> {
        if hierarchies.is_empty() {
            return Err(TsiError::invalid_param("no hierarchies to put"));
        }
        info!("Putting {} hierarchies", hierarchies.len());
        let request = HierarchyBatchRequest {
            put: Some(hierarchies),
            ..Default::default()
        };
        self.send_batch(&request).await
    }

    /// Get hierarchies by id
    pub async fn get_hierarchies_by_ids<I, S>(&self, ids: I) -> TsiResult<HierarchyBatchResponse>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = HierarchyBatchRequest {
            get: Some(by_ids(ids)?),
            ..Default::default()
        };
        self.send_batch(&request).await
    }

    /// Get hierarchies by name
    pub async fn get_hierarchies_by_names<I, S>(&self, names: I) -> TsiResult<HierarchyBatchResponse>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = HierarchyBatchRequest {
            get: Some(by_names(names)?),
            ..Default::default()
        };
        self.send_batch(&request).await
    }

    /// Delete hierarchies by id
    pub async fn delete_hierarchies_by_ids<I, S>(&self, ids: I) -> TsiResult<HierarchyBatchResponse>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = HierarchyBatchRequest {
            delete: Some(by_ids(ids)?),
            ..Default::default()
        };
        self.send_batch(&request).await
    }

    /// Delete hierarchies by name
    pub async fn delete_hierarchies_by_names<I, S>(
        &self,
        names: I,
    ) -> TsiResult<HierarchyBatchResponse>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = HierarchyBatchRequest {
            delete: Some(by_names(names)?),
            ..Default::default()
        };
        self.send_batch(&request).await
    }

    async fn send_batch(&self, request: &HierarchyBatchRequest) -> TsiResult<HierarchyBatchResponse> {
        debug!("Request body: {:?}", request);
        self.client
            .batch(request, RESOURCE)
            .await?
            .ok_or_else(|| TsiError::malformed("empty response to hierarchies batch"))
    }

    /// Fetch one page and insist on the `hierarchies` key
    async fn fetch_page(
        &self,
        req: RequestBuilder,
    ) -> TsiResult<HierarchyListResult> {
        let page: HierarchyPage = self
            .client
            .execute(req)
            .await?
            .ok_or_else(|| TsiError::malformed("empty response to hierarchies request"))?;

        let hierarchies = page
            .hierarchies
            .ok_or_else(|| TsiError::malformed("response has no `hierarchies` key"))?;
        Ok(HierarchyListResult {
            hierarchies,
            continuation_token: page.continuation_token,
            extra: page.extra,
        })
    }
}

fn collect_keys<I, S>(keys: I, what: &str) -> TsiResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    if keys.is_empty() {
        return Err(TsiError::invalid_param(format!("no hierarchy {} given", what)));
    }
    Ok(keys)
}

fn by_ids<I, S>(ids: I) -> TsiResult<HierarchiesRequestBatchGetDelete>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Ok(HierarchiesRequestBatchGetDelete {
        hierarchy_ids: Some(collect_keys(ids, "ids")?),
        names: None,
    })
}

fn by_names<I, S>(names: I) -> TsiResult<HierarchiesRequestBatchGetDelete>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Ok(HierarchiesRequestBatchGetDelete {
        hierarchy_ids: None,
        names: Some(collect_keys(names, "names")?),
    })
}
