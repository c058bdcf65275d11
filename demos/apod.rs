use nasapi::{client::Client, config::Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = Client::from_config(&Config::from_env()?)?;
    let date = std::env::args().nth(1);

    let apod = client.apod(date.as_deref(), true).await?;

    println!("{}", apod.title().unwrap_or("(untitled)"));
    println!("{} by {}", apod.date_str().unwrap_or("?"), apod.copyright());
    println!();
    println!("{}", apod.explanation().unwrap_or_default());
    println!();

    if let Some(url) = apod.url() {
        println!("{:?}: {}", apod.media_type(), url);
    }

    if let Some(status) = client.rate_limit(nasapi::route::APOD) {
        println!("{} of {} requests left this hour", status.remaining, status.limit);
    }

    Ok(())
}
