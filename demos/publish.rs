//! Publishing examples.
//!
//! ```text
//! TOGOMQ_TOKEN=... cargo run --example publish
//! ```

use serde_json::json;
use togomq::{Client, Config, Message};

fn main() -> Result<(), togomq::Error> {
    let client = Client::connect(Config::from_env()?)?;

    // Simple message
    let result = client.publish_batch(&[Message::new("orders", "Simple order message")])?;
    println!("Published {} message(s)", result.messages_received());

    // Custom variables
    let mut order = Message::new("orders", "Order with metadata");
    order.with_variables([
        ("priority", "high"),
        ("customer_id", "12345"),
        ("order_type", "express"),
    ]);
    client.publish_batch(&[order])?;

    // Delayed delivery and retention
    let mut delayed = Message::new("notifications", "Delayed notification");
    delayed.with_postpone(60);
    let mut retained = Message::new("events", "Event with retention");
    retained.with_retention(3600);
    client.publish_batch(&[delayed, retained])?;

    // One batch, many messages
    let batch: Vec<Message> = (1..=10)
        .map(|i| {
            let mut message = Message::new("batch-test", format!("Batch message #{}", i));
            message.with_variable("message_number", i.to_string());
            message
        })
        .collect();
    let result = client.publish_batch(&batch)?;
    println!("Published {} messages in batch", result.messages_received());

    // JSON body with every option
    let mut premium = Message::json(
        "orders.premium",
        &json!({ "order_id": "ORD-12345", "items": ["item1", "item2"], "total": 299.99 }),
    )
    .map_err(|e| togomq::Error::validation("Could not encode order").with_source(e))?;
    premium
        .with_variables([("priority", "urgent"), ("customer_tier", "premium")])
        .with_postpone(30)
        .with_retention(7200);
    client.publish_batch(&[premium])?;

    client.close();
    Ok(())
}
