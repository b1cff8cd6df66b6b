use tqs_client::{Queue, TqsError};

#[tokio::test]
async fn test_queue_creation() {
    let queue = Queue::new("http://localhost:8080", "jobs");
    assert!(queue.is_ok());
}

#[tokio::test]
async fn test_queue_builder() {
    let config = Queue::builder()
        .endpoint("http://localhost:8080")
        .token("abc")
        .admin_timeout_ms(5000)
        .max_retries(3)
        .retry_delay_ms(100)
        .build();

    let queue = Queue::with_config(config, "jobs").unwrap();
    assert_eq!(queue.url(), "http://localhost:8080/queues/jobs");
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    // bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let queue = Queue::new(format!("http://127.0.0.1:{}", port), "jobs").unwrap();

    let result = queue.exists().await;
    match result {
        Err(err) => assert!(err.is_retryable(), "unexpected error {:?}", err),
        Ok(found) => panic!("Expected transport error, got Ok({})", found),
    }
}

#[tokio::test]
async fn test_error_types() {
    let timeout_err = TqsError::Timeout(2000);
    assert!(timeout_err.is_retryable());

    let connection_err = TqsError::Connection("test".to_string());
    assert!(connection_err.is_retryable());

    let validation_err = TqsError::Validation("test".to_string());
    assert!(!validation_err.is_retryable());

    let http_err = TqsError::QueueHttp {
        queue: "jobs".to_string(),
        status: 500,
    };
    assert!(!http_err.is_retryable());
}

#[cfg(test)]
mod config_tests {
    use std::time::Duration;
    use tqs_client::ConfigBuilder;

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .endpoint("https://queues.example.com")
            .token("secret")
            .admin_timeout(Duration::from_secs(10))
            .reuse_connections(true)
            .max_retries(5)
            .retry_delay(Duration::from_millis(200))
            .build();

        assert_eq!(config.endpoint, "https://queues.example.com");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.admin_timeout, Duration::from_secs(10));
        assert!(config.reuse_connections);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_config_default() {
        let config = ConfigBuilder::new().build();

        assert_eq!(config.endpoint, "http://localhost:8080");
        assert!(config.token.is_none());
        assert_eq!(config.admin_timeout, Duration::from_secs(2));
        assert!(!config.reuse_connections);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(100));
    }
}

#[cfg(test)]
mod options_tests {
    use std::time::Duration;
    use tqs_client::GetOptions;

    #[test]
    fn test_get_options_default() {
        let options = GetOptions::default();

        assert_eq!(options.wait, Duration::ZERO);
        assert!(!options.delete);
        assert!(!options.retry);
    }

    #[test]
    fn test_get_options_chaining() {
        let options = GetOptions::new()
            .with_wait(Duration::from_secs(30))
            .with_delete(true)
            .with_retry(true);

        assert_eq!(
            options,
            GetOptions {
                wait: Duration::from_secs(30),
                delete: true,
                retry: true,
            }
        );
    }
}
