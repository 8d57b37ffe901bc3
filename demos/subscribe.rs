//! Subscription examples.
//!
//! ```text
//! TOGOMQ_TOKEN=... cargo run --example subscribe -- orders.*
//! ```

use togomq::{Client, Config, ErrorKind, SubscribeOptions};

fn main() -> Result<(), togomq::Error> {
    let topic = std::env::args().nth(1).unwrap_or_else(|| "orders".to_string());
    let client = Client::connect(Config::from_env()?)?;

    let mut options = SubscribeOptions::new(topic);
    options.with_batch(10).with_speed_per_sec(100);

    let mut received = 0;
    for message in client.subscribe(&options)? {
        let message = match message {
            Ok(message) => message,
            Err(err) if err.kind() == ErrorKind::Subscribe => {
                eprintln!("subscription ended: {}", err);
                break;
            }
            Err(err) => return Err(err),
        };

        received += 1;
        println!(
            "[{}] {} {}",
            message.uuid().unwrap_or("-"),
            message.topic(),
            message.body_str().unwrap_or("<binary>")
        );
        for (key, value) in message.variables() {
            println!("    {} = {}", key, value);
        }

        if received == 100 {
            break;
        }
    }

    println!("Received {} message(s)", received);
    client.close();
    Ok(())
}
