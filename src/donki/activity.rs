use chrono::{DateTime, Utc};

use super::{date_range, leaves, time, Instrument, LinkedEvent};
use crate::client::Client;
use crate::error::Result;
use crate::resource::{view, Events, OneOrMany};
use crate::route;

view! {
    /// A solar flare.
    pub struct Flare {
        flr_id: str = "flrID",
        begin_time_str: str = "beginTime",
        peak_time_str: str = "peakTime",
        end_time_str: str = "endTime",
        /// X-ray class of the flare, such as `M2.3`.
        class_type: str = "classType",
        source_location: str = "sourceLocation",
        active_region_num: u64 = "activeRegionNum",
        link: str = "link",
    }
    cached {
        begin_time: Option<DateTime<Utc>>,
        peak_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        instruments: OneOrMany<Instrument>,
        linked_events: OneOrMany<LinkedEvent>,
    }
}

impl Flare {
    pub fn begin_time(&self) -> Option<DateTime<Utc>> {
        *self.begin_time.get_or_init(|| time(&self.node, "beginTime"))
    }

    pub fn peak_time(&self) -> Option<DateTime<Utc>> {
        *self.peak_time.get_or_init(|| time(&self.node, "peakTime"))
    }

    /// `None` while the flare is ongoing.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        *self.end_time.get_or_init(|| time(&self.node, "endTime"))
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

/// Events that are only an ID, a time, instruments and links.
macro_rules! event_view {
    ($(#[$meta:meta])* $name:ident, $id:ident = $key:literal) => {
        view! {
            $(#[$meta])*
            pub struct $name {
                $id: str = $key,
                event_time_str: str = "eventTime",
                link: str = "link",
            }
            cached {
                event_time: Option<DateTime<Utc>>,
                instruments: OneOrMany<Instrument>,
                linked_events: OneOrMany<LinkedEvent>,
            }
        }

        impl $name {
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
    };
}

event_view!(
    /// A solar energetic particle event.
    Sep,
    sep_id = "sepID"
);

event_view!(
    /// A magnetopause crossing.
    Mpc,
    mpc_id = "mpcID"
);

event_view!(
    /// A radiation belt enhancement.
    Rbe,
    rbe_id = "rbeID"
);

event_view!(
    /// A high speed stream.
    Hss,
    hss_id = "hssID"
);

impl Client {
    /// Returns the solar flares that started between `start_date` and `end_date`.
    pub async fn flr(&self, start_date: Option<&str>, end_date: Option<&str>) -> Result<Events<Flare>> {
        self.request(route::FLR, &date_range(start_date, end_date)?)
            .await
    }

    /// Returns the solar energetic particle events between `start_date` and `end_date`.
    pub async fn sep(&self, start_date: Option<&str>, end_date: Option<&str>) -> Result<Events<Sep>> {
        self.request(route::SEP, &date_range(start_date, end_date)?)
            .await
    }

    /// Returns the magnetopause crossings between `start_date` and `end_date`.
    pub async fn mpc(&self, start_date: Option<&str>, end_date: Option<&str>) -> Result<Events<Mpc>> {
        self.request(route::MPC, &date_range(start_date, end_date)?)
            .await
    }

    /// Returns the radiation belt enhancements between `start_date` and `end_date`.
    pub async fn rbe(&self, start_date: Option<&str>, end_date: Option<&str>) -> Result<Events<Rbe>> {
        self.request(route::RBE, &date_range(start_date, end_date)?)
            .await
    }

    /// Returns the high speed streams between `start_date` and `end_date`.
    pub async fn hss(&self, start_date: Option<&str>, end_date: Option<&str>) -> Result<Events<Hss>> {
        self.request(route::HSS, &date_range(start_date, end_date)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Node, View};
    use chrono::Timelike;
    use mockito::{mock, Matcher};
    use serde_json::json;

    #[test]
    fn flare_times_are_parsed_on_first_access() {
        let flare = Flare::from_node(Node::new(json!({
            "beginTime": "2016-01-01T23:00Z",
            "peakTime": "2016-01-02T00:10Z",
            "endTime": "not a time",
        })));

        assert!(flare.peak_time.get().is_none());
        assert!(flare.end_time.get().is_none());

        assert_eq!(flare.peak_time().unwrap().minute(), 10);
        assert_eq!(flare.end_time(), None);

        assert_eq!(flare.peak_time.get().copied().flatten(), flare.peak_time());
        assert_eq!(flare.end_time.get(), Some(&None));
        assert!(flare.begin_time.get().is_none());
    }

    #[tokio::test]
    async fn flr_search() {
        let client = Client::new(&mockito::server_url(), "DONKI_FLR").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/DONKI/FLR?api_key=DONKI_FLR&endDate=2016-01-02&startDate=2016-01-01",
            )),
        )
        .with_body(include_str!("../mocked/donki_flr.json"))
        .create();

        let flares = client
            .flr(Some("2016-01-01"), Some("2016-01-02"))
            .await
            .unwrap();
        let flare = flares.events().single().unwrap();

        assert_eq!(flare.class_type(), Some("M2.3"));
        assert_eq!(flare.active_region_num(), Some(12473));
        assert_eq!(flare.peak_time().unwrap().hour(), 0);
        assert_eq!(flare.end_time(), None);

        match flare.linked_events() {
            OneOrMany::Many(events) => assert_eq!(events.len(), 2),
            other => panic!("expected two linked events, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn sep_search() {
        let client = Client::new(&mockito::server_url(), "DONKI_SEP").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from("/DONKI/SEP?api_key=DONKI_SEP")),
        )
        .with_body(include_str!("../mocked/donki_sep.json"))
        .create();

        let events = client.sep(None, None).await.unwrap();
        let sep = events.events().single().unwrap();

        assert_eq!(sep.sep_id(), Some("2016-01-02T02:48:00-SEP-001"));
        assert_eq!(sep.event_time().unwrap().minute(), 48);
        assert_eq!(
            sep.instruments().single().unwrap().display_name,
            "GOES13: SEM/EPS >10 MeV"
        );
    }

    #[tokio::test]
    async fn empty_searches() {
        let client = Client::new(&mockito::server_url(), "DONKI_EMPTY").unwrap();

        let _m = [
            mock(
                "GET",
                Matcher::Exact(String::from(
                    "/DONKI/HSS?api_key=DONKI_EMPTY&startDate=2016-01-01",
                )),
            )
            .with_body("")
            .create(),
            mock(
                "GET",
                Matcher::Exact(String::from(
                    "/DONKI/MPC?api_key=DONKI_EMPTY&startDate=2016-01-01",
                )),
            )
            .with_body("[]")
            .create(),
        ];

        assert!(client
            .hss(Some("2016-01-01"), None)
            .await
            .unwrap()
            .is_empty());
        assert!(client
            .mpc(Some("2016-01-01"), None)
            .await
            .unwrap()
            .is_empty());
    }
}
