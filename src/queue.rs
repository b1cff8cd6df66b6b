use crate::{
    config::{Config, ConfigBuilder},
    error::{Result, TqsError},
    message::*,
    retry::RetryStrategy,
};
use reqwest::header::CONNECTION;
use reqwest::{IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Non-standard header name expected by the service.
const AUTHENTICATION_HEADER: &str = "Authentication";

/// Aggregate message counts for a queue at the time of the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatistics {
    /// Messages that a get would return right now
    pub visible: u64,
    /// Messages whose visible date is still in the future
    pub delayed: u64,
    /// Messages currently held under a lease
    pub leased: u64,
}

impl QueueStatistics {
    pub fn total(&self) -> u64 {
        self.visible + self.delayed + self.leased
    }
}

/// Retrieval options for [`Queue::get`].
///
/// The default performs a plain, non-blocking lease of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Long-poll duration. Sent as whole seconds; anything below one second means no wait.
    pub wait: Duration,
    /// Remove the message on read instead of leasing it.
    pub delete: bool,
    /// Retry transport failures with the queue's backoff settings.
    pub retry: bool,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if self.delete {
            query.push(("delete", "true".to_string()));
        }
        let wait_secs = self.wait.as_secs();
        if wait_secs > 0 {
            query.push(("wait_time", wait_secs.to_string()));
        }
        query
    }
}

/// Handle to one named queue on a queue service endpoint.
///
/// A `Queue` is an immutable value: it holds the endpoint, the queue name, the
/// derived resource URL `{endpoint}/queues/{name}` and an HTTP client. Cloning
/// is cheap and clones share the underlying client.
///
/// Every operation performs a single request. Create, statistics and lease
/// deletion are bounded by [`Config::admin_timeout`]; put and get are not,
/// since a get may long-poll for as long as the caller asked.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use tqs_client::{GetOptions, Queue, TqsError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), TqsError> {
///     let queue = Queue::new("http://localhost:8080", "jobs")?;
///
///     match queue.create().await {
///         Ok(()) | Err(TqsError::QueueAlreadyExists { .. }) => {}
///         Err(e) => return Err(e),
///     }
///
///     queue.put("resize image 42", "text/plain").await?;
///
///     let options = GetOptions::new().with_wait(Duration::from_secs(10));
///     let message = queue.get(&options).await?;
///     println!("Got: {}", message.body);
///     message.delete().await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Queue {
    config: Arc<Config>,
    name: String,
    url: Url,
    http: reqwest::Client,
}

impl Queue {
    /// Creates a handle for queue `name` at `endpoint` with default configuration.
    ///
    /// No request is made; use [`create`](Self::create) or
    /// [`exists`](Self::exists) to talk to the service.
    ///
    /// # Errors
    ///
    /// Returns [`TqsError::Validation`] if the endpoint is not an absolute URL,
    /// or the name is empty, `.`, `..` or contains `/`, `?` or `#`. Any other
    /// character is percent-encoded into a single path segment.
    pub fn new(endpoint: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let config = ConfigBuilder::new().endpoint(endpoint).build();
        Self::with_config(config, name)
    }

    /// Creates a handle for queue `name` using a custom [`Config`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use tqs_client::Queue;
    ///
    /// # fn example() -> Result<(), tqs_client::TqsError> {
    /// let config = Queue::builder()
    ///     .endpoint("https://queues.example.com")
    ///     .token("my-token")
    ///     .admin_timeout(Duration::from_secs(5))
    ///     .build();
    ///
    /// let queue = Queue::with_config(config, "jobs")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_config(mut config: Config, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(TqsError::Validation("Endpoint must not be empty".to_string()));
        }
        let url = resource_url(&endpoint, &name)?;
        config.endpoint = endpoint;

        let mut builder = reqwest::Client::builder();
        if !config.reuse_connections {
            builder = builder.pool_max_idle_per_host(0);
        }
        let http = builder
            .build()
            .map_err(|e| TqsError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            name,
            url,
            http,
        })
    }

    /// Returns a [`ConfigBuilder`], equivalent to [`ConfigBuilder::new()`].
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Queue resource URL, `{endpoint}/queues/{name}`.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the queue on the service.
    ///
    /// # Errors
    ///
    /// * [`TqsError::QueueAlreadyExists`] if the service answers 409
    /// * [`TqsError::QueueHttp`] for any other non-200 status
    /// * [`TqsError::Connection`] / [`TqsError::Timeout`] for transport failures
    pub async fn create(&self) -> Result<()> {
        let mut url = self.url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop();
        }
        let request = self
            .request(Method::POST, url)
            .json(&CreateQueueRequest {
                name: self.name.clone(),
            });

        let response = self
            .execute(request, Some(self.config.admin_timeout))
            .await?;

        match response.status() {
            StatusCode::OK => {
                debug!(queue = %self.name, "queue created");
                Ok(())
            }
            StatusCode::CONFLICT => Err(TqsError::QueueAlreadyExists {
                queue: self.name.clone(),
            }),
            status => Err(self.http_error(status)),
        }
    }

    /// Fetches the visible, delayed and leased message counts.
    ///
    /// # Errors
    ///
    /// * [`TqsError::QueueNotFound`] if the service answers 404
    /// * [`TqsError::QueueHttp`] for any other non-200 status
    /// * [`TqsError::Serialization`] if the body is not a statistics document
    /// * [`TqsError::Connection`] / [`TqsError::Timeout`] for transport failures
    pub async fn statistics(&self) -> Result<QueueStatistics> {
        let url = self.subresource(&["statistics"]);
        let timeout = Some(self.config.admin_timeout);

        let response = self
            .execute(self.request(Method::GET, url), timeout)
            .await?;

        match response.status() {
            StatusCode::OK => self.read_json(response, timeout).await,
            StatusCode::NOT_FOUND => Err(self.not_found()),
            status => Err(self.http_error(status)),
        }
    }

    /// Reports whether the queue exists, based on [`statistics`](Self::statistics).
    ///
    /// A missing queue yields `Ok(false)`; every other error is returned unchanged.
    pub async fn exists(&self) -> Result<bool> {
        match self.statistics().await {
            Ok(_) => Ok(true),
            Err(TqsError::QueueNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Enqueues one message.
    ///
    /// The service assigns visibility, expiry and lease data; none of it is
    /// returned. Never retried, since a repeated put would duplicate the message.
    ///
    /// # Errors
    ///
    /// * [`TqsError::QueueNotFound`] if the service answers 404
    /// * [`TqsError::QueueHttp`] for any other non-200 status
    /// * [`TqsError::Connection`] for transport failures
    pub async fn put(&self, body: impl Into<String>, body_type: impl Into<String>) -> Result<()> {
        let request = PutMessagesRequest {
            messages: vec![MessageBody {
                body: body.into(),
                body_type: body_type.into(),
            }],
        };

        let response = self
            .execute(self.request(Method::POST, self.url.clone()).json(&request), None)
            .await?;

        match response.status() {
            StatusCode::OK => {
                debug!(queue = %self.name, "message put");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(self.not_found()),
            status => Err(self.http_error(status)),
        }
    }

    /// Leases one message from the queue.
    ///
    /// With [`GetOptions::wait`] set the service holds the request open for up
    /// to that long waiting for a message; no client-side timeout applies.
    /// With [`GetOptions::delete`] set the message is removed as it is read,
    /// so calling [`Message::delete`] on it afterwards yields
    /// [`TqsError::LeaseNotFound`].
    ///
    /// # Errors
    ///
    /// * [`TqsError::QueueNotFound`] if the queue does not exist
    /// * [`TqsError::QueueEmpty`] if the queue exists but nothing is available
    /// * [`TqsError::QueueHttp`] for any other non-200 status
    /// * [`TqsError::Protocol`] if the response holds more than one message or
    ///   a message without a lease id
    /// * [`TqsError::Serialization`] if the body is not a message batch
    /// * [`TqsError::Connection`] for transport failures, retried first when
    ///   [`GetOptions::retry`] is set
    pub async fn get(&self, options: &GetOptions) -> Result<Message> {
        let strategy = if options.retry {
            RetryStrategy::new(self.config.max_retries, self.config.retry_delay)
        } else {
            RetryStrategy::none()
        };

        strategy.execute(|| self.get_once(options)).await
    }

    /// Leases one message and decodes its body as JSON.
    ///
    /// Returns the decoded value together with the message so the lease can be
    /// released afterwards.
    ///
    /// # Errors
    ///
    /// Everything [`get`](Self::get) returns, plus [`TqsError::BodyDecode`] when
    /// the body is not valid JSON for `T`. That error carries the leased message.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use serde::Deserialize;
    /// use tqs_client::{GetOptions, Queue, TqsError};
    ///
    /// #[derive(Deserialize)]
    /// struct Job {
    ///     id: u64,
    /// }
    ///
    /// # async fn example(queue: Queue) -> Result<(), TqsError> {
    /// match queue.get_value::<Job>(&GetOptions::default()).await {
    ///     Ok((job, message)) => {
    ///         println!("job {}", job.id);
    ///         message.delete().await?;
    ///     }
    ///     Err(TqsError::BodyDecode { message, .. }) => message.delete().await?,
    ///     Err(e) => return Err(e),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_value<T: DeserializeOwned>(
        &self,
        options: &GetOptions,
    ) -> Result<(T, Message)> {
        let message = self.get(options).await?;

        match message.decode() {
            Ok(value) => Ok((value, message)),
            Err(source) => Err(TqsError::BodyDecode {
                message: Box::new(message),
                source,
            }),
        }
    }

    async fn get_once(&self, options: &GetOptions) -> Result<Message> {
        let response = self.execute(self.get_request(options), None).await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(self.not_found()),
            status => return Err(self.http_error(status)),
        }

        let batch: GetMessagesResponse = self.read_json(response, None).await?;
        let mut records = batch.messages.unwrap_or_default();

        match records.len() {
            0 => Err(TqsError::QueueEmpty {
                queue: self.name.clone(),
            }),
            1 => {
                let record = records.remove(0);
                if record.lease_uuid.is_empty() {
                    return Err(TqsError::Protocol(format!(
                        "Queue <{}> returned a message without a lease id",
                        self.name
                    )));
                }
                debug!(queue = %self.name, lease = %record.lease_uuid, "message leased");
                Ok(record.bind(self.clone()))
            }
            count => Err(TqsError::Protocol(format!(
                "Queue <{}> returned {} messages, expected at most one",
                self.name, count
            ))),
        }
    }

    fn get_request(&self, options: &GetOptions) -> RequestBuilder {
        let request = self.request(Method::GET, self.url.clone());
        let query = options.query();
        if query.is_empty() {
            request
        } else {
            request.query(&query)
        }
    }

    /// Resource URL with `segments` appended, each percent-encoded.
    pub(crate) fn subresource(&self, segments: &[&str]) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Starts a request carrying the auth and connection headers.
    pub(crate) fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        let mut request = self.http.request(method, url);

        if let Some(token) = self.config.token.as_deref().filter(|t| !t.is_empty()) {
            request = request.header(AUTHENTICATION_HEADER, format!("token {}", token));
        }
        if !self.config.reuse_connections {
            request = request.header(CONNECTION, "close");
        }

        request
    }

    /// Sends `request`, bounded by `timeout` when given.
    pub(crate) async fn execute(
        &self,
        request: RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<Response> {
        let request = match timeout {
            Some(limit) => request.timeout(limit),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        debug!(
            queue = %self.name,
            url = %response.url(),
            status = response.status().as_u16(),
            "response received"
        );

        Ok(response)
    }

    async fn read_json<R: DeserializeOwned>(
        &self,
        response: Response,
        timeout: Option<Duration>,
    ) -> Result<R> {
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        serde_json::from_slice(&body).map_err(Into::into)
    }

    fn not_found(&self) -> TqsError {
        TqsError::QueueNotFound {
            queue: self.name.clone(),
        }
    }

    fn http_error(&self, status: StatusCode) -> TqsError {
        TqsError::QueueHttp {
            queue: self.name.clone(),
            status: status.as_u16(),
        }
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("url", &self.url.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TqsError::Validation("Queue name must not be empty".to_string()));
    }
    if name == "." || name == ".." {
        return Err(TqsError::Validation(format!(
            "Queue name <{}> is a relative path segment",
            name
        )));
    }
    if name.contains(['/', '?', '#']) {
        return Err(TqsError::Validation(format!(
            "Queue name <{}> contains a reserved URL character",
            name
        )));
    }
    Ok(())
}

/// Builds `{endpoint}/queues/{name}` with `name` as one encoded path segment.
fn resource_url(endpoint: &str, name: &str) -> Result<Url> {
    let invalid = |reason: String| {
        TqsError::Validation(format!("Invalid endpoint <{}>: {}", endpoint, reason))
    };

    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot carry a path".to_string()))?
        .pop_if_empty()
        .push("queues")
        .push(name);

    Ok(url)
}

fn transport_error(err: reqwest::Error, timeout: Option<Duration>) -> TqsError {
    match timeout {
        Some(limit) if err.is_timeout() => TqsError::Timeout(limit.as_millis() as u64),
        _ => TqsError::Connection(err.to_string()),
    }
}
