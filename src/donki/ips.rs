use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{leaves, time, Catalog, Instrument, LinkedEvent};
use crate::client::Client;
use crate::error::Result;
use crate::query::Options;
use crate::resource::{view, Events, OneOrMany};
use crate::route;
use crate::utils::validate_dates;

view! {
    /// An interplanetary shock.
    pub struct Ips {
        activity_id: str = "activityID",
        catalog: str = "catalog",
        location: str = "location",
        event_time_str: str = "eventTime",
        link: str = "link",
    }
    cached {
        event_time: Option<DateTime<Utc>>,
        instruments: OneOrMany<Instrument>,
        linked_events: OneOrMany<LinkedEvent>,
    }
}

impl Ips {
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        *self.event_time.get_or_init(|| time(&self.node, "eventTime"))
    }

    pub fn instruments(&self) -> &OneOrMany<Instrument> {
        self.instruments
            .get_or_init(|| leaves(&self.node, "instruments"))
    }

    pub fn linked_events(&self) -> &OneOrMany<LinkedEvent> {
        self.linked_events
            .get_or_init(|| leaves(&self.node, "linkedEvents"))
    }
}

/// Where an interplanetary shock was detected.
#[derive(Debug, PartialEq, Eq, Serialize, Clone, Copy)]
pub enum IpsLocation {
    #[serde(rename = "ALL")]
    All,
    Earth,
    #[serde(rename = "MESSENGER")]
    Messenger,
    #[serde(rename = "STEREO A")]
    StereoA,
    #[serde(rename = "STEREO B")]
    StereoB,
}

/// A search query returning [`Ips`] instances.
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IpsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<IpsLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    catalog: Option<Catalog>,
}

impl IpsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_date<T: Into<Option<S>>, S: Into<String>>(mut self, date: T) -> Self {
        self.start_date = date.into().map(Into::into);
        self
    }

    pub fn end_date<T: Into<Option<S>>, S: Into<String>>(mut self, date: T) -> Self {
        self.end_date = date.into().map(Into::into);
        self
    }

    pub fn location<T: Into<Option<IpsLocation>>>(mut self, location: T) -> Self {
        self.location = location.into();
        self
    }

    pub fn catalog<T: Into<Option<Catalog>>>(mut self, catalog: T) -> Self {
        self.catalog = catalog.into();
        self
    }
}

impl Client {
    /// Returns the interplanetary shocks matching the search query.
    pub async fn ips(&self, query: &IpsQuery) -> Result<Events<Ips>> {
        validate_dates([query.start_date.as_deref(), query.end_date.as_deref()])?;

        self.request(route::IPS, &Options::from_query(query)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{mock, Matcher};

    #[tokio::test]
    async fn ips_search() {
        let client = Client::new(&mockito::server_url(), "DONKI_IPS").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/DONKI/IPS?api_key=DONKI_IPS&location=STEREO+A&startDate=2016-01-01",
            )),
        )
        .with_body(include_str!("../mocked/donki_ips.json"))
        .create();

        let shocks = client
            .ips(
                &IpsQuery::new()
                    .start_date("2016-01-01")
                    .location(IpsLocation::StereoA),
            )
            .await
            .unwrap();

        let shock = shocks.events().single().unwrap();
        assert_eq!(shock.location(), Some("Earth"));
        assert_eq!(
            shock
                .instruments()
                .iter()
                .map(|i| i.display_name.as_str())
                .collect::<Vec<_>>(),
            vec!["ACE: SWEPAM", "ACE: MAG"]
        );
        assert!(shock.linked_events().is_empty());
        assert!(shock.event_time().is_some());
    }
}
