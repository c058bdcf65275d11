use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::client::Client;
use crate::error::Result;
use crate::query::Options;
use crate::resource::{view, Root};
use crate::route;
use crate::utils::{parse_utc, validate_date};

/// Where an [`EarthAsset`] comes from.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct EarthResource {
    pub dataset: String,
    pub planet: String,
}

view! {
    /// The Landsat 8 scene closest in time to the requested date, for a point of the Earth.
    pub struct EarthAsset {
        id: str = "id",
        url: str = "url",
        service_version: str = "service_version",
        date_str: str = "date",
    }
    cached {
        date: Option<DateTime<Utc>>,
        resource: Option<EarthResource>,
    }
}

impl EarthAsset {
    /// When the scene was acquired.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        *self.date.get_or_init(|| {
            self.date_str()
                .and_then(|s| parse_utc(s, "%Y-%m-%dT%H:%M:%S%.f"))
        })
    }

    pub fn resource(&self) -> Option<&EarthResource> {
        self.resource
            .get_or_init(|| self.node.parse("resource"))
            .as_ref()
    }
}

impl Client {
    /// Returns the scene closest to `date` covering the point at `lat`, `lon`. `dim` is the width
    /// and height of the scene in degrees (the API defaults to 0.025).
    pub async fn earth_assets(
        &self,
        lat: f64,
        lon: f64,
        date: &str,
        dim: Option<f64>,
    ) -> Result<Root<EarthAsset>> {
        validate_date(date)?;

        let options = Options::new()
            .set("lat", lat)
            .set("lon", lon)
            .set("date", date)
            .set_opt("dim", dim);

        self.request(route::EARTH_ASSETS, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use mockito::{mock, Matcher};

    #[tokio::test]
    async fn earth_assets() {
        let client = Client::new(&mockito::server_url(), "EARTH_ASSETS").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/planetary/earth/assets?api_key=EARTH_ASSETS&date=2014-02-01&dim=0.15&lat=1.5&lon=100.75",
            )),
        )
        .with_body(include_str!("mocked/earth_assets.json"))
        .create();

        let asset = client
            .earth_assets(1.5, 100.75, "2014-02-01", Some(0.15))
            .await
            .unwrap();

        assert_eq!(asset.id(), Some("LC8_L1T_TOA/LC81270592014035LGN00"));
        assert_eq!(asset.date().unwrap().day(), 4);
        assert_eq!(asset.resource().unwrap().dataset, "LANDSAT/LC08/C01/T1_SR");
        assert_eq!(asset.service_version(), Some("v5"));
    }
}
