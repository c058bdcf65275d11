use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

use crate::client::Client;
use crate::error::Result;
use crate::query::Options;
use crate::resource::{view, OneOrMany, Root, View};
use crate::route;
use crate::utils::{from_epoch_millis, parse_date, parse_utc, validate_dates};

/// Pagination links of a NeoWs response.
#[derive(Debug, Default, PartialEq, Eq, Deserialize, Clone)]
pub struct NeoLinks {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default, rename = "self")]
    pub self_link: Option<String>,
}

/// Position of a [`NeoBrowse`] page in the whole catalogue.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone, Copy)]
pub struct NeoPage {
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Copy)]
pub struct Diameter {
    #[serde(rename = "estimated_diameter_min")]
    pub min: f64,
    #[serde(rename = "estimated_diameter_max")]
    pub max: f64,
}

/// Estimated diameter range of an object, in every unit the API reports.
#[derive(Debug, PartialEq, Deserialize, Clone, Copy)]
pub struct EstimatedDiameter {
    pub kilometers: Diameter,
    pub meters: Diameter,
    pub miles: Diameter,
    pub feet: Diameter,
}

#[serde_as]
#[derive(Debug, PartialEq, Deserialize, Clone, Copy)]
pub struct RelativeVelocity {
    #[serde_as(as = "DisplayFromStr")]
    pub kilometers_per_second: f64,
    #[serde_as(as = "DisplayFromStr")]
    pub kilometers_per_hour: f64,
    #[serde_as(as = "DisplayFromStr")]
    pub miles_per_hour: f64,
}

#[serde_as]
#[derive(Debug, PartialEq, Deserialize, Clone, Copy)]
pub struct MissDistance {
    #[serde_as(as = "DisplayFromStr")]
    pub astronomical: f64,
    #[serde_as(as = "DisplayFromStr")]
    pub lunar: f64,
    #[serde_as(as = "DisplayFromStr")]
    pub kilometers: f64,
    #[serde_as(as = "DisplayFromStr")]
    pub miles: f64,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct OrbitClass {
    #[serde(rename = "orbit_class_type")]
    pub kind: String,
    #[serde(rename = "orbit_class_description")]
    pub description: String,
    #[serde(rename = "orbit_class_range")]
    pub range: String,
}

view! {
    /// A close approach of an object to a body of the solar system.
    pub struct CloseApproach {
        date_str: str = "close_approach_date",
        full_date_str: str = "close_approach_date_full",
        epoch_millis: i64 = "epoch_date_close_approach",
        orbiting_body: str = "orbiting_body",
    }
    cached {
        date: Option<NaiveDate>,
        datetime: Option<DateTime<Utc>>,
        relative_velocity: Option<RelativeVelocity>,
        miss_distance: Option<MissDistance>,
    }
}

impl CloseApproach {
    pub fn date(&self) -> Option<NaiveDate> {
        *self.date.get_or_init(|| self.date_str().and_then(parse_date))
    }

    /// Time of the approach, to the minute. `2015-Sep-08 20:28` in the payload.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        *self.datetime.get_or_init(|| {
            self.full_date_str()
                .and_then(|s| parse_utc(s, "%Y-%b-%d %H:%M"))
                .or_else(|| self.epoch_millis().and_then(from_epoch_millis))
        })
    }

    pub fn relative_velocity(&self) -> Option<&RelativeVelocity> {
        self.relative_velocity
            .get_or_init(|| self.node.parse("relative_velocity"))
            .as_ref()
    }

    pub fn miss_distance(&self) -> Option<&MissDistance> {
        self.miss_distance
            .get_or_init(|| self.node.parse("miss_distance"))
            .as_ref()
    }
}

view! {
    /// Orbit determination of an object. Only sent by lookups.
    pub struct OrbitalData {
        orbit_id: str = "orbit_id",
        determination_date_str: str = "orbit_determination_date",
        first_observation_date_str: str = "first_observation_date",
        last_observation_date_str: str = "last_observation_date",
        data_arc_in_days: u64 = "data_arc_in_days",
        observations_used: u64 = "observations_used",
        orbit_uncertainty: u64 = "orbit_uncertainty",
        minimum_orbit_intersection: f64 = "minimum_orbit_intersection",
        jupiter_tisserand_invariant: f64 = "jupiter_tisserand_invariant",
        epoch_osculation: f64 = "epoch_osculation",
        eccentricity: f64 = "eccentricity",
        semi_major_axis: f64 = "semi_major_axis",
        inclination: f64 = "inclination",
        ascending_node_longitude: f64 = "ascending_node_longitude",
        orbital_period: f64 = "orbital_period",
        perihelion_distance: f64 = "perihelion_distance",
        perihelion_argument: f64 = "perihelion_argument",
        aphelion_distance: f64 = "aphelion_distance",
        perihelion_time: f64 = "perihelion_time",
        mean_anomaly: f64 = "mean_anomaly",
        mean_motion: f64 = "mean_motion",
        equinox: str = "equinox",
    }
    cached {
        determination_date: Option<DateTime<Utc>>,
        first_observation_date: Option<NaiveDate>,
        last_observation_date: Option<NaiveDate>,
        orbit_class: Option<OrbitClass>,
    }
}

impl OrbitalData {
    pub fn determination_date(&self) -> Option<DateTime<Utc>> {
        *self.determination_date.get_or_init(|| {
            self.determination_date_str()
                .and_then(|s| parse_utc(s, "%Y-%m-%d %H:%M:%S"))
        })
    }

    pub fn first_observation_date(&self) -> Option<NaiveDate> {
        *self
            .first_observation_date
            .get_or_init(|| self.first_observation_date_str().and_then(parse_date))
    }

    pub fn last_observation_date(&self) -> Option<NaiveDate> {
        *self
            .last_observation_date
            .get_or_init(|| self.last_observation_date_str().and_then(parse_date))
    }

    pub fn orbit_class(&self) -> Option<&OrbitClass> {
        self.orbit_class
            .get_or_init(|| self.node.parse("orbit_class"))
            .as_ref()
    }
}

view! {
    /// A near earth object.
    pub struct NeoObject {
        id: str = "id",
        neo_reference_id: str = "neo_reference_id",
        name: str = "name",
        designation: str = "designation",
        nasa_jpl_url: str = "nasa_jpl_url",
        absolute_magnitude_h: f64 = "absolute_magnitude_h",
        is_potentially_hazardous: bool = "is_potentially_hazardous_asteroid",
        is_sentry_object: bool = "is_sentry_object",
        sentry_data: str = "sentry_data",
    }
    cached {
        links: Option<NeoLinks>,
        estimated_diameter: Option<EstimatedDiameter>,
        close_approaches: OneOrMany<CloseApproach>,
        orbital_data: Option<OrbitalData>,
    }
}

impl NeoObject {
    pub fn links(&self) -> Option<&NeoLinks> {
        self.links.get_or_init(|| self.node.parse("links")).as_ref()
    }

    pub fn estimated_diameter(&self) -> Option<&EstimatedDiameter> {
        self.estimated_diameter
            .get_or_init(|| self.node.parse("estimated_diameter"))
            .as_ref()
    }

    /// Feeds only send the approach of the requested day; lookups send all of them.
    pub fn close_approaches(&self) -> &OneOrMany<CloseApproach> {
        self.close_approaches
            .get_or_init(|| self.node.many("close_approach_data"))
    }

    pub fn orbital_data(&self) -> Option<&OrbitalData> {
        self.orbital_data
            .get_or_init(|| self.node.child("orbital_data"))
            .as_ref()
    }
}

/// The objects of one day of a [`NeoFeed`].
#[derive(Debug)]
pub struct NeoDay {
    pub date: NaiveDate,
    pub objects: Vec<NeoObject>,
}

view! {
    /// Objects approaching Earth over a range of days.
    pub struct NeoFeed {
        element_count: u64 = "element_count",
    }
    cached {
        links: Option<NeoLinks>,
        days: Vec<NeoDay>,
    }
}

impl NeoFeed {
    pub fn links(&self) -> Option<&NeoLinks> {
        self.links.get_or_init(|| self.node.parse("links")).as_ref()
    }

    /// The objects of every day of the feed, oldest day first.
    pub fn days(&self) -> &[NeoDay] {
        self.days.get_or_init(|| {
            let mut days: Vec<NeoDay> = self
                .node
                .json("near_earth_objects")
                .and_then(|v| v.as_object())
                .into_iter()
                .flatten()
                .filter_map(|(date, objects)| {
                    Some(NeoDay {
                        date: parse_date(date)?,
                        objects: objects
                            .as_array()?
                            .iter()
                            .filter(|v| v.is_object())
                            .map(|v| NeoObject::from_node(crate::resource::Node::new(v.clone())))
                            .collect(),
                    })
                })
                .collect();

            days.sort_by_key(|d| d.date);
            days
        })
    }

    /// Every object of the feed, day after day.
    pub fn objects(&self) -> impl Iterator<Item = &NeoObject> {
        self.days().iter().flat_map(|d| d.objects.iter())
    }
}

view! {
    /// A page of the whole catalogue of near earth objects.
    pub struct NeoBrowse {}
    cached {
        links: Option<NeoLinks>,
        page: Option<NeoPage>,
        objects: OneOrMany<NeoObject>,
    }
}

impl NeoBrowse {
    pub fn links(&self) -> Option<&NeoLinks> {
        self.links.get_or_init(|| self.node.parse("links")).as_ref()
    }

    pub fn page(&self) -> Option<&NeoPage> {
        self.page.get_or_init(|| self.node.parse("page")).as_ref()
    }

    pub fn objects(&self) -> &OneOrMany<NeoObject> {
        self.objects
            .get_or_init(|| self.node.many("near_earth_objects"))
    }
}

impl Client {
    /// Returns the objects whose closest approach to Earth falls between `start_date` and
    /// `end_date` (`YYYY-MM-DD`). The API accepts ranges of up to 7 days: it starts today when
    /// `start_date` is `None`, and ends 7 days after the start when `end_date` is `None`.
    ///
    /// ```no_run
    /// # use nasapi::client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> nasapi::error::Result<()> {
    /// let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
    /// let feed = client.neo_feed(Some("2015-09-07"), Some("2015-09-08")).await?;
    ///
    /// for day in feed.days() {
    ///     println!("{}: {} objects", day.date, day.objects.len());
    /// }
    /// # Ok(()) }
    /// ```
    pub async fn neo_feed(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Root<NeoFeed>> {
        validate_dates([start_date, end_date])?;

        let options = Options::new()
            .set_opt("start_date", start_date)
            .set_opt("end_date", end_date);

        self.request(route::NEO_FEED, &options).await
    }

    /// Returns the object with the given SPK-ID.
    pub async fn neo_lookup(&self, asteroid_id: &str) -> Result<Root<NeoObject>> {
        self.request(
            route::NEO_LOOKUP,
            &Options::new().set("asteroid_id", asteroid_id),
        )
        .await
    }

    /// Returns the first page of the catalogue.
    pub async fn neo_browse(&self) -> Result<Root<NeoBrowse>> {
        self.request(route::NEO_BROWSE, &Options::new()).await
    }

    /// Returns the page `page` (starting at 0) of the catalogue, `size` objects per page.
    pub async fn neo_browse_page(&self, page: u32, size: u32) -> Result<Root<NeoBrowse>> {
        let options = Options::new().set("page", page).set("size", size);
        self.request(route::NEO_BROWSE, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use mockito::{mock, Matcher};

    #[tokio::test]
    async fn neo_feed() {
        let client = Client::new(&mockito::server_url(), "NEO_FEED").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/neo/rest/v1/feed?api_key=NEO_FEED&end_date=2015-09-08&start_date=2015-09-07",
            )),
        )
        .with_body(include_str!("mocked/neo_feed_2015-09-07.json"))
        .create();

        let feed = client
            .neo_feed(Some("2015-09-07"), Some("2015-09-08"))
            .await
            .unwrap();

        assert_eq!(feed.element_count(), Some(3));
        assert_eq!(
            feed.days()
                .iter()
                .map(|d| (d.date.day(), d.objects.len()))
                .collect::<Vec<_>>(),
            vec![(7, 1), (8, 2)]
        );
        assert_eq!(
            feed.objects().map(|o| o.id().unwrap()).collect::<Vec<_>>(),
            vec!["2440012", "2465633", "3426410"]
        );
        assert!(feed.links().unwrap().next.is_some());

        let first = &feed.days()[1].objects[0];
        assert_eq!(first.is_potentially_hazardous(), Some(true));

        let approach = first.close_approaches().single().unwrap();
        assert_eq!(approach.orbiting_body(), Some("Earth"));
        assert_eq!(
            approach.relative_velocity().unwrap().kilometers_per_second,
            18.1279360862
        );

        let at = approach.datetime().unwrap();
        assert_eq!((at.month(), at.day(), at.hour(), at.minute()), (9, 8, 20, 28));
    }

    #[tokio::test]
    async fn neo_feed_validates_dates() {
        let client = Client::new(&mockito::server_url(), "NEO_FEED_DATES").unwrap();

        assert!(client.neo_feed(Some("07/09/2015"), None).await.is_err());
        assert!(client.neo_feed(Some("2015-09-07"), Some("tomorrow")).await.is_err());
        assert!(client.neo_feed(None, Some("tomorrow")).await.is_err());
    }

    #[tokio::test]
    async fn neo_lookup() {
        let client = Client::new(&mockito::server_url(), "NEO_LOOKUP").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from("/neo/rest/v1/neo/3542519?api_key=NEO_LOOKUP")),
        )
        .with_body(include_str!("mocked/neo_lookup_3542519.json"))
        .create();

        let neo = client.neo_lookup("3542519").await.unwrap();

        assert_eq!(neo.name(), Some("(2010 PK9)"));
        assert_eq!(neo.designation(), Some("2010 PK9"));

        match neo.close_approaches() {
            OneOrMany::Many(approaches) => {
                assert_eq!(approaches.len(), 2);
                assert_eq!(approaches[1].date(), NaiveDate::from_ymd_opt(2021, 7, 30));
            }
            other => panic!("expected two approaches, got {:?}", other),
        }

        let diameter = neo.estimated_diameter().unwrap();
        assert!(diameter.meters.min < diameter.meters.max);

        let orbit = neo.orbital_data().unwrap();
        assert_eq!(orbit.orbit_id(), Some("55"));
        assert_eq!(orbit.observations_used(), Some(248));
        assert_eq!(orbit.orbit_uncertainty(), Some(0));
        assert_eq!(orbit.eccentricity(), Some(0.6918058574888368));
        assert_eq!(orbit.orbit_class().unwrap().kind, "APO");
        assert_eq!(
            orbit.first_observation_date(),
            NaiveDate::from_ymd_opt(2010, 7, 16)
        );
        assert_eq!(orbit.determination_date().unwrap().hour(), 6);
        assert!(std::ptr::eq(neo.orbital_data().unwrap(), orbit));
    }

    #[tokio::test]
    async fn neo_browse_page() {
        let client = Client::new(&mockito::server_url(), "NEO_BROWSE").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/neo/rest/v1/neo/browse?api_key=NEO_BROWSE&page=1&size=2",
            )),
        )
        .with_body(include_str!("mocked/neo_browse_page-1.json"))
        .create();

        let page = client.neo_browse_page(1, 2).await.unwrap();

        assert_eq!(page.page().unwrap().number, 1);
        assert_eq!(page.page().unwrap().total_pages, 13494);
        assert_eq!(page.objects().len(), 2);
        assert_eq!(
            page.objects().first().unwrap().name(),
            Some("719 Albert (A911 TB)")
        );
    }
}
