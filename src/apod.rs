use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Not;

use crate::client::Client;
use crate::error::Result;
use crate::query::Options;
use crate::resource::{view, Events, Root};
use crate::route;
use crate::utils::{parse_date, validate_dates};

/// Kind of media an [`Apod`] entry links to.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    #[serde(other)]
    Other,
}

view! {
    /// An Astronomy Picture of the Day entry.
    pub struct Apod {
        /// The day of the entry, as sent by the API (`YYYY-MM-DD`).
        date_str: str = "date",
        title: str = "title",
        explanation: str = "explanation",
        /// URL of the high definition image, for images.
        hdurl: str = "hdurl",
        /// URL of the media in standard definition.
        sd_url: str = "url",
        /// For videos, when requested with [`ApodQuery::thumbs`].
        thumbnail_url: str = "thumbnail_url",
        concepts: json = "concepts",
    }
    cached {
        date: Option<NaiveDate>,
        media_type: MediaType,
    }
}

impl Apod {
    pub fn date(&self) -> Option<NaiveDate> {
        *self.date.get_or_init(|| self.date_str().and_then(parse_date))
    }

    /// The best URL available: the HD one if there is one.
    pub fn url(&self) -> Option<&str> {
        self.hdurl().or_else(|| self.sd_url())
    }

    pub fn media_type(&self) -> MediaType {
        *self
            .media_type
            .get_or_init(|| self.node.parse("media_type").unwrap_or(MediaType::Other))
    }

    /// Entries without a copyright field are in the public domain.
    pub fn copyright(&self) -> &str {
        self.node.str("copyright").unwrap_or("Public Domain")
    }

    pub fn service_version(&self) -> &str {
        self.node.str("service_version").unwrap_or("v1")
    }
}

/// A search query returning several [`Apod`] entries.
///
/// ```
/// # use nasapi::apod::ApodQuery;
/// let by_range = ApodQuery::new()
///     .start_date("2021-06-01")
///     .end_date("2021-06-07");
///
/// let at_random = ApodQuery::new()
///     .count(5)
///     .thumbs(true);
/// ```
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
pub struct ApodQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,

    /// Mutually exclusive with the date range.
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,

    #[serde(skip_serializing_if = "<&bool>::not")]
    hd: bool,

    #[serde(skip_serializing_if = "<&bool>::not")]
    concept_tags: bool,

    #[serde(skip_serializing_if = "<&bool>::not")]
    thumbs: bool,
}

impl ApodQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// First day of the range, `YYYY-MM-DD`.
    pub fn start_date<T: Into<Option<S>>, S: Into<String>>(mut self, date: T) -> Self {
        self.start_date = date.into().map(Into::into);
        self
    }

    /// Last day of the range, `YYYY-MM-DD`. Defaults to today.
    pub fn end_date<T: Into<Option<S>>, S: Into<String>>(mut self, date: T) -> Self {
        self.end_date = date.into().map(Into::into);
        self
    }

    /// Return `count` randomly chosen entries instead of a range.
    pub fn count<T: Into<Option<u32>>>(mut self, count: T) -> Self {
        self.count = count.into();
        self
    }

    pub fn hd(mut self, hd: bool) -> Self {
        self.hd = hd;
        self
    }

    pub fn concept_tags(mut self, concept_tags: bool) -> Self {
        self.concept_tags = concept_tags;
        self
    }

    /// Whether to return thumbnails for video entries.
    pub fn thumbs(mut self, thumbs: bool) -> Self {
        self.thumbs = thumbs;
        self
    }
}

impl Client {
    /// Returns the Astronomy Picture of the Day of `date` (`YYYY-MM-DD`), or of today.
    ///
    /// ```no_run
    /// # use nasapi::client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> nasapi::error::Result<()> {
    /// let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
    /// let apod = client.apod(Some("2021-06-01"), true).await?;
    ///
    /// println!("{:?}: {:?}", apod.title(), apod.url());
    /// # Ok(()) }
    /// ```
    pub async fn apod(&self, date: Option<&str>, hd: bool) -> Result<Root<Apod>> {
        validate_dates([date])?;

        let options = Options::new().set_opt("date", date).set("hd", hd);
        self.request(route::APOD, &options).await
    }

    /// Returns the entries of a date range, or random entries.
    pub async fn apod_search(&self, query: &ApodQuery) -> Result<Events<Apod>> {
        validate_dates([query.start_date.as_deref(), query.end_date.as_deref()])?;

        self.request(route::APOD, &Options::from_query(query)?)
            .await
    }
}
