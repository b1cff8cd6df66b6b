use crate::error::{Result, TqsError};
use crate::queue::Queue;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

/// A message leased from a queue with [`Queue::get`].
///
/// The lease is an exclusive, time-bounded hold. Until it is released with
/// [`Message::delete`] no other consumer receives this message; once
/// `lease_timeout` seconds have passed since `lease_date` the service makes
/// the message visible again and the lease id stops being valid.
///
/// Messages are only produced by the client when it decodes a get response,
/// so `lease_uuid` is never empty.
///
/// # Examples
///
/// ```no_run
/// use tqs_client::{GetOptions, Queue};
///
/// # async fn example() -> Result<(), tqs_client::TqsError> {
/// let queue = Queue::new("http://localhost:8080", "jobs")?;
/// let message = queue.get(&GetOptions::default()).await?;
/// println!("{} ({}): {}", message.lease_uuid, message.body_type, message.body);
/// message.delete().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Message {
    queue: Queue,
    /// Raw body text as it was put
    pub body: String,
    /// Caller-defined content tag sent alongside the body
    pub body_type: String,
    pub create_date: DateTime<Utc>,
    /// When the message became (or becomes) eligible for retrieval
    pub visible_date: DateTime<Utc>,
    pub expire_date: DateTime<Utc>,
    /// Opaque lease token assigned by the service on get
    pub lease_uuid: String,
    /// Lease length in seconds, counted from `lease_date`
    pub lease_timeout: u64,
    pub lease_date: Option<DateTime<Utc>>,
}

impl Message {
    /// The queue this message was leased from.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Parses the body text as JSON.
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// Moment the service will consider the lease expired, if the lease date is known.
    pub fn lease_expires_at(&self) -> Option<DateTime<Utc>> {
        let timeout = TimeDelta::try_seconds(i64::try_from(self.lease_timeout).ok()?)?;
        self.lease_date?.checked_add_signed(timeout)
    }

    /// Local estimate only. The service remains the authority on lease expiry.
    pub fn is_lease_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.lease_expires_at().is_some_and(|expires| now >= expires)
    }

    /// Acknowledges the message by releasing its lease, removing it from the queue.
    ///
    /// Uses the queue's admin timeout. Any status other than 404 counts as
    /// success; non-2xx statuses are logged but not surfaced.
    ///
    /// # Errors
    ///
    /// * [`TqsError::LeaseNotFound`] if the lease was already released, was
    ///   consumed by a deleting get, or expired
    /// * [`TqsError::Connection`] / [`TqsError::Timeout`] for transport failures
    pub async fn delete(&self) -> Result<()> {
        let url = self.queue.subresource(&["leases", self.lease_uuid.as_str()]);
        let timeout = self.queue.config().admin_timeout;

        let request = self.queue.request(Method::DELETE, url);
        let response = self.queue.execute(request, Some(timeout)).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(TqsError::LeaseNotFound {
                lease: self.lease_uuid.clone(),
            });
        }

        if !status.is_success() {
            warn!(
                queue = %self.queue.name(),
                lease = %self.lease_uuid,
                status = status.as_u16(),
                "lease release returned unexpected status, treating as released"
            );
        } else {
            debug!(queue = %self.queue.name(), lease = %self.lease_uuid, "lease released");
        }

        Ok(())
    }
}

// Wire structures for the queue service's JSON API

/// Single message as returned inside a get response.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageRecord {
    pub body: String,
    #[serde(rename = "type")]
    pub body_type: String,
    pub create_date: DateTime<Utc>,
    pub visible_date: DateTime<Utc>,
    pub expire_date: DateTime<Utc>,
    #[serde(default)]
    pub lease_uuid: String,
    #[serde(default)]
    pub lease_timeout: u64,
    #[serde(default)]
    pub lease_date: Option<DateTime<Utc>>,
}

impl MessageRecord {
    pub fn bind(self, queue: Queue) -> Message {
        Message {
            queue,
            body: self.body,
            body_type: self.body_type,
            create_date: self.create_date,
            visible_date: self.visible_date,
            expire_date: self.expire_date,
            lease_uuid: self.lease_uuid,
            lease_timeout: self.lease_timeout,
            lease_date: self.lease_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetMessagesResponse {
    /// Absent or `null` when nothing was available
    #[serde(default)]
    pub messages: Option<Vec<MessageRecord>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageBody {
    pub body: String,
    #[serde(rename = "type")]
    pub body_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PutMessagesRequest {
    pub messages: Vec<MessageBody>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateQueueRequest {
    pub name: String,
}
