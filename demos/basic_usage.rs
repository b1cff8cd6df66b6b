use tqs_client::{GetOptions, Queue, TqsError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let queue = Queue::new("http://localhost:8080", "demo")?;

    println!("Creating queue {}...", queue.name());
    match queue.create().await {
        Ok(()) => println!("✅ Queue created"),
        Err(TqsError::QueueAlreadyExists { .. }) => println!("Queue already exists"),
        Err(e) => return Err(e.into()),
    }

    println!("\nAdding a message to the queue...");
    queue.put("Hello, TQS!", "text/plain").await?;

    let stats = queue.statistics().await?;
    println!(
        "Visible: {}, delayed: {}, leased: {}",
        stats.visible, stats.delayed, stats.leased
    );

    println!("\nLeasing a message from the queue...");
    let message = match queue.get(&GetOptions::default()).await {
        Ok(message) => message,
        Err(TqsError::QueueEmpty { .. }) => {
            println!("Message is not visible yet, try again shortly");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!(
        "Got message ({}): {} [lease {} for {}s]",
        message.body_type, message.body, message.lease_uuid, message.lease_timeout
    );

    println!("\nReleasing lease {}...", message.lease_uuid);
    message.delete().await?;

    // A second release finds nothing to release
    match message.delete().await {
        Err(TqsError::LeaseNotFound { lease }) => println!("Lease {} is gone", lease),
        other => println!("Unexpected result: {:?}", other),
    }

    Ok(())
}
