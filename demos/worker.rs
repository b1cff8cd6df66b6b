use serde::Deserialize;
use std::time::Duration;
use tqs_client::{GetOptions, Queue, TqsError};
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Job {
    id: u64,
    action: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Queue::builder()
        .endpoint("http://localhost:8080")
        .reuse_connections(true)
        .max_retries(3)
        .retry_delay_ms(250)
        .build();

    let queue = Queue::with_config(config, "jobs")?;
    let options = GetOptions::new()
        .with_wait(Duration::from_secs(20))
        .with_retry(true);

    println!("Starting worker, long-polling {}...", queue.url());

    loop {
        match queue.get_value::<Job>(&options).await {
            Ok((job, message)) => {
                println!("Processing job {}: {}", job.id, job.action);

                match process_job(&job).await {
                    Ok(()) => {
                        println!("✅ Finished job {}", job.id);
                        match message.delete().await {
                            Ok(()) => {}
                            Err(TqsError::LeaseNotFound { .. }) => {
                                println!("Lease for job {} expired before acknowledgement", job.id)
                            }
                            Err(e) => println!("Could not acknowledge job {}: {}", job.id, e),
                        }
                    }
                    Err(e) => {
                        // Leaving the lease alone makes the job visible again once it expires
                        println!(
                            "❌ Job {} failed: {} (redelivered after {}s)",
                            job.id, e, message.lease_timeout
                        );
                    }
                }
            }
            Err(TqsError::BodyDecode { message, source }) => {
                println!("Discarding malformed message {}: {}", message.lease_uuid, source);
                message.delete().await?;
            }
            Err(TqsError::QueueEmpty { .. }) => {
                println!("No jobs available, polling again...");
            }
            Err(TqsError::QueueNotFound { queue }) => {
                println!("Queue {} does not exist, stopping", queue);
                return Ok(());
            }
            Err(e) => {
                println!("Error fetching jobs: {}", e);
                sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

async fn process_job(job: &Job) -> Result<(), String> {
    sleep(Duration::from_millis(100)).await;

    if job.action == "fail" {
        Err("action requested failure".to_string())
    } else {
        Ok(())
    }
}
