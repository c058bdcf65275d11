//! Space weather events from DONKI, the Space Weather Database Of Notifications, Knowledge,
//! Information.
//!
//! Every search takes an optional date range (`YYYY-MM-DD`). When it's left out, the API defaults
//! to the last 30 days.

mod activity;
mod cme;
mod gst;
mod ips;
mod notifications;
mod wsa;

pub use activity::{Flare, Hss, Mpc, Rbe, Sep};
pub use cme::{Catalog, Cme, CmeAnalysis, CmeAnalysisQuery, EnlilRun};
pub use gst::{Gst, KpIndex};
pub use ips::{Ips, IpsLocation, IpsQuery};
pub use notifications::{Notification, NotificationType};
pub use wsa::{CmeInput, WsaEnlilSimulation};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::Result;
use crate::query::Options;
use crate::resource::{view, Node, OneOrMany};
use crate::utils::{parse_donki_time, validate_dates};

/// An instrument that observed an event.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct Instrument {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Another event related to an event.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct LinkedEvent {
    #[serde(rename = "activityID")]
    pub activity_id: String,
}

view! {
    /// Predicted arrival of a CME at a location of the solar system.
    pub struct Impact {
        is_glancing_blow: bool = "isGlancingBlow",
        location: str = "location",
        arrival_time_str: str = "arrivalTime",
    }
    cached {
        arrival_time: Option<DateTime<Utc>>,
    }
}

impl Impact {
    pub fn arrival_time(&self) -> Option<DateTime<Utc>> {
        *self
            .arrival_time
            .get_or_init(|| self.arrival_time_str().and_then(parse_donki_time))
    }
}

/// Deserializes every element of a plural field, collapsed with [`OneOrMany::collect`].
pub(crate) fn leaves<T: DeserializeOwned>(node: &Node, key: &str) -> OneOrMany<T> {
    node.many_with(key, |v| serde_json::from_value(v.clone()).ok())
}

pub(crate) fn time(node: &Node, key: &str) -> Option<DateTime<Utc>> {
    node.str(key).and_then(parse_donki_time)
}

/// The `startDate` and `endDate` options of a search.
pub(crate) fn date_range(start_date: Option<&str>, end_date: Option<&str>) -> Result<Options> {
    validate_dates([start_date, end_date])?;

    Ok(Options::new()
        .set_opt("startDate", start_date)
        .set_opt("endDate", end_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::resource::View;
    use serde_json::json;

    #[test]
    fn date_ranges() {
        let options = date_range(Some("2016-01-01"), None).unwrap();
        assert_eq!(
            options.iter().collect::<Vec<_>>(),
            vec![("startDate", "2016-01-01")]
        );

        assert!(matches!(
            date_range(None, Some("2016-01-32")),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn leaves_skip_malformed_elements() {
        let node = Node::new(json!({
            "instruments": [{ "displayName": "ACE: MAG" }, { "name": "?" }],
        }));

        let instruments = leaves::<Instrument>(&node, "instruments");
        assert_eq!(instruments.single().unwrap().display_name, "ACE: MAG");
    }

    #[test]
    fn impacts() {
        let impact = Impact::from_node(Node::new(json!({
            "isGlancingBlow": true,
            "location": "Mars",
            "arrivalTime": "2016-09-13T09:00Z",
        })));

        assert!(impact.arrival_time.get().is_none());
        assert_eq!(impact.is_glancing_blow(), Some(true));
        assert_eq!(
            impact.arrival_time().unwrap().to_rfc3339(),
            "2016-09-13T09:00:00+00:00"
        );
        assert!(impact.arrival_time.get().is_some());
    }
}
