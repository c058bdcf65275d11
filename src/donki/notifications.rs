use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{date_range, time};
use crate::client::Client;
use crate::error::Result;
use crate::resource::{view, Events};
use crate::route;

/// Kind of event a [`Notification`] is about.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub enum NotificationType {
    /// Only used to search every kind at once.
    #[serde(rename = "all")]
    All,
    #[serde(rename = "FLR")]
    Flr,
    #[serde(rename = "SEP")]
    Sep,
    #[serde(rename = "CME")]
    Cme,
    #[serde(rename = "IPS")]
    Ips,
    #[serde(rename = "MPC")]
    Mpc,
    #[serde(rename = "GST")]
    Gst,
    #[serde(rename = "RBE")]
    Rbe,
    /// Weekly summaries.
    #[serde(rename = "report", alias = "Report")]
    Report,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Flr => "FLR",
            Self::Sep => "SEP",
            Self::Cme => "CME",
            Self::Ips => "IPS",
            Self::Mpc => "MPC",
            Self::Gst => "GST",
            Self::Rbe => "RBE",
            Self::Report => "report",
        };

        f.write_str(s)
    }
}

view! {
    /// A message issued by the Space Weather Research Center.
    pub struct Notification {
        message_type_str: str = "messageType",
        message_id: str = "messageID",
        message_url: str = "messageURL",
        issue_time_str: str = "messageIssueTime",
        body: str = "messageBody",
    }
    cached {
        issue_time: Option<DateTime<Utc>>,
    }
}

impl Notification {
    /// `None` for types this crate doesn't know about.
    pub fn message_type(&self) -> Option<NotificationType> {
        self.node.parse("messageType")
    }

    pub fn issue_time(&self) -> Option<DateTime<Utc>> {
        *self
            .issue_time
            .get_or_init(|| time(&self.node, "messageIssueTime"))
    }
}

impl Client {
    /// Returns the notifications of type `kind` issued between `start_date` and `end_date`.
    pub async fn notifications(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        kind: NotificationType,
    ) -> Result<Events<Notification>> {
        let options = date_range(start_date, end_date)?.set("type", kind);
        self.request(route::NOTIFICATIONS, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{mock, Matcher};

    #[tokio::test]
    async fn notifications_search() {
        let client = Client::new(&mockito::server_url(), "DONKI_NOTIFICATIONS").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/DONKI/notifications?api_key=DONKI_NOTIFICATIONS&endDate=2016-01-02&startDate=2016-01-01&type=all",
            )),
        )
        .with_body(include_str!("../mocked/donki_notifications.json"))
        .create();

        let notifications = client
            .notifications(Some("2016-01-01"), Some("2016-01-02"), NotificationType::All)
            .await
            .unwrap();

        assert_eq!(
            notifications
                .iter()
                .map(Notification::message_type)
                .collect::<Vec<_>>(),
            vec![Some(NotificationType::Report), Some(NotificationType::Flr)]
        );
        assert_eq!(
            notifications.iter().next().unwrap().message_id(),
            Some("20160101-7D-001")
        );
        assert!(notifications
            .iter()
            .all(|n| n.issue_time().is_some()));
    }

    #[test]
    fn type_names() {
        assert_eq!(NotificationType::Report.to_string(), "report");
        assert_eq!(NotificationType::Gst.to_string(), "GST");
    }
}
