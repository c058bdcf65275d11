//! Wrapper crate for the [NASA Open APIs](https://api.nasa.gov).
//!
//! ## Usage
//!
//! First, create a [`Client`]. You need an API key: the public `DEMO_KEY` works for trying things
//! out, but it is heavily rate limited. Sign up on [api.nasa.gov](https://api.nasa.gov) to get
//! your own.
//!
//! ```no_run
//! # use nasapi::client::Client;
//! # fn main() -> Result<(), nasapi::error::Error> {
//! let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
//! # Ok(()) }
//! ```
//!
//! Or read the key and the other settings from the environment (and `.env`):
//!
//! ```no_run
//! # use nasapi::{client::Client, config::Config};
//! # fn main() -> Result<(), nasapi::error::Error> {
//! let client = Client::from_config(&Config::from_env()?)?;
//! # Ok(()) }
//! ```
//!
//! Now it's ready to go! For example you can get the Astronomy Picture of the Day like this:
//!
//! ```no_run
//! # use nasapi::client::Client;
//! # #[tokio::main]
//! # async fn main() -> nasapi::error::Result<()> {
//! # let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
//! let apod = client.apod(Some("2021-06-01"), true).await?;
//!
//! println!("{:?}: {:?}", apod.title(), apod.url());
//! # Ok(()) }
//! ```
//!
//! Or search space weather events:
//!
//! ```no_run
//! # use nasapi::client::Client;
//! # #[tokio::main]
//! # async fn main() -> nasapi::error::Result<()> {
//! # let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
//! for flare in client.flr(Some("2016-01-01"), Some("2016-01-30")).await?.iter() {
//!     println!("{:?} {:?}", flare.begin_time(), flare.class_type());
//! }
//! # Ok(()) }
//! ```
//!
//! ## Responses
//!
//! Responses keep the JSON they were received as ([`Root::to_json`], [`Events::to_json`]).
//! Accessors read fields on demand; nested objects and parsed values are built on first access and
//! cached for the lifetime of the response. Plural fields are [`OneOrMany`]: empty, a single
//! value, or several.
//!
//! ## Rate Limiting
//!
//! > Limits are placed on the number of API requests you may make using your API key. Rate limits
//! > may vary by service, but the defaults are: Hourly Limit: 1,000 requests per hour.
//! >
//! > [[...]](https://api.nasa.gov/#authentication)
//!
//! `nasapi` remembers the quota the API reports for every route (see [`Client::rate_limit`]) and
//! refuses to send a request to a route whose quota was exhausted by the last response. Requests
//! that fail transiently are attempted up to 5 times, waiting 2, 4, 8 then 16 seconds in between.
//!
//! [`Client`]: client::Client
//! [`Client::rate_limit`]: client::Client::rate_limit
//! [`Root::to_json`]: resource::Root::to_json
//! [`Events::to_json`]: resource::Events::to_json
//! [`OneOrMany`]: resource::OneOrMany

mod utils;

pub use utils::validate_date;

/// Client related structures.
pub mod client;

/// Configuration management.
pub mod config;

/// Error management.
pub mod error;

/// Request parameters and their validation.
pub mod query;

/// Response mapping.
pub mod resource;

/// Routes of the API.
pub mod route;

/// Astronomy Picture of the Day.
pub mod apod;

/// Near Earth Object Web Service.
pub mod neo;

pub mod donki;

/// Mars rover photos.
pub mod mars;

/// Earth Polychromatic Imaging Camera.
pub mod epic;

/// Landsat imagery of the Earth.
pub mod earth;
