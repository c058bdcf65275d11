use nasapi::{client::Client, config::Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let start = args.next();
    let end = args.next();

    let client = Client::from_config(&Config::from_env()?)?;
    let feed = client.neo_feed(start.as_deref(), end.as_deref()).await?;

    println!("{} objects", feed.element_count().unwrap_or_default());

    for day in feed.days() {
        println!("{}:", day.date);

        for neo in &day.objects {
            let hazard = if neo.is_potentially_hazardous().unwrap_or(false) {
                " (potentially hazardous)"
            } else {
                ""
            };

            let distance = neo
                .close_approaches()
                .first()
                .and_then(|approach| approach.miss_distance())
                .map(|d| format!(", missing by {:.0} km", d.kilometers))
                .unwrap_or_default();

            println!("- {}{}{}", neo.name().unwrap_or("?"), distance, hazard);
        }
    }

    Ok(())
}
