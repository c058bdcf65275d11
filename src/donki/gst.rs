use chrono::{DateTime, Utc};

use super::{date_range, leaves, time, LinkedEvent};
use crate::client::Client;
use crate::error::Result;
use crate::resource::{view, Events, OneOrMany};
use crate::route;

view! {
    /// A planetary K-index measurement.
    pub struct KpIndex {
        observed_time_str: str = "observedTime",
        kp_index: f64 = "kpIndex",
        source: str = "source",
    }
    cached {
        observed_time: Option<DateTime<Utc>>,
    }
}

impl KpIndex {
    pub fn observed_time(&self) -> Option<DateTime<Utc>> {
        *self
            .observed_time
            .get_or_init(|| time(&self.node, "observedTime"))
    }
}

view! {
    /// A geomagnetic storm.
    pub struct Gst {
        gst_id: str = "gstID",
        start_time_str: str = "startTime",
        link: str = "link",
    }
    cached {
        start_time: Option<DateTime<Utc>>,
        kp_indices: OneOrMany<KpIndex>,
        linked_events: OneOrMany<LinkedEvent>,
    }
}

impl Gst {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        *self.start_time.get_or_init(|| time(&self.node, "startTime"))
    }

    pub fn kp_indices(&self) -> &OneOrMany<KpIndex> {
        self.kp_indices.get_or_init(|| self.node.many("allKpIndex"))
    }

    /// The highest K-index measured during the storm.
    pub fn max_kp_index(&self) -> Option<f64> {
        self.kp_indices()
            .iter()
            .filter_map(KpIndex::kp_index)
            .reduce(f64::max)
    }

    pub fn linked_events(&self) -> &OneOrMany<LinkedEvent> {
        self.linked_events
            .get_or_init(|| leaves(&self.node, "linkedEvents"))
    }
}

impl Client {
    /// Returns the geomagnetic storms that started between `start_date` and `end_date`.
    pub async fn gst(&self, start_date: Option<&str>, end_date: Option<&str>) -> Result<Events<Gst>> {
        self.request(route::GST, &date_range(start_date, end_date)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use mockito::{mock, Matcher};

    #[tokio::test]
    async fn gst_search() {
        let client = Client::new(&mockito::server_url(), "DONKI_GST").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/DONKI/GST?api_key=DONKI_GST&startDate=2016-01-01",
            )),
        )
        .with_body(include_str!("../mocked/donki_gst.json"))
        .create();

        let storms = client.gst(Some("2016-01-01"), None).await.unwrap();
        let storm = storms.events().single().unwrap();

        assert_eq!(storm.gst_id(), Some("2016-01-01T00:00:00-GST-001"));
        assert_eq!(storm.kp_indices().len(), 2);
        assert_eq!(storm.max_kp_index(), Some(6.0));
        assert_eq!(
            storm.kp_indices().first().unwrap().observed_time().unwrap().hour(),
            3
        );
        assert_eq!(storm.linked_events().len(), 1);
    }
}
