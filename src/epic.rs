use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::client::Client;
use crate::error::Result;
use crate::query::Options;
use crate::resource::{view, Events};
use crate::route;
use crate::utils::{parse_utc, validate_date};

const ARCHIVE_URL: &str = "https://epic.gsfc.nasa.gov/archive";

/// Set of EPIC images, by processing.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Natural,
    Enhanced,
    Aerosol,
    Cloud,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collection::Natural => "natural",
            Collection::Enhanced => "enhanced",
            Collection::Aerosol => "aerosol",
            Collection::Cloud => "cloud",
        })
    }
}

/// Format of the archived file of an [`EpicImage`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ImageFormat {
    Png,
    Jpg,
    Thumbnail,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Copy)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Position in the J2000 frame, in kilometers from the center of the Earth.
#[derive(Debug, PartialEq, Deserialize, Clone, Copy)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Copy)]
pub struct AttitudeQuaternions {
    pub q0: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

view! {
    /// A picture of the Earth taken by the EPIC camera of DSCOVR.
    pub struct EpicImage {
        identifier: str = "identifier",
        caption: str = "caption",
        /// Name of the image file, without extension.
        image: str = "image",
        version: str = "version",
        date_str: str = "date",
    }
    cached {
        date: Option<DateTime<Utc>>,
        centroid_coordinates: Option<Coordinates>,
        dscovr_position: Option<Position>,
        lunar_position: Option<Position>,
        sun_position: Option<Position>,
        attitude_quaternions: Option<AttitudeQuaternions>,
    }
}

impl EpicImage {
    /// When the picture was taken.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        *self
            .date
            .get_or_init(|| self.date_str().and_then(|s| parse_utc(s, "%Y-%m-%d %H:%M:%S")))
    }

    /// Latitude and longitude of the point of the Earth at the center of the picture.
    pub fn centroid_coordinates(&self) -> Option<&Coordinates> {
        self.centroid_coordinates
            .get_or_init(|| self.node.parse("centroid_coordinates"))
            .as_ref()
    }

    pub fn dscovr_position(&self) -> Option<&Position> {
        self.dscovr_position
            .get_or_init(|| self.node.parse("dscovr_j2000_position"))
            .as_ref()
    }

    pub fn lunar_position(&self) -> Option<&Position> {
        self.lunar_position
            .get_or_init(|| self.node.parse("lunar_j2000_position"))
            .as_ref()
    }

    pub fn sun_position(&self) -> Option<&Position> {
        self.sun_position
            .get_or_init(|| self.node.parse("sun_j2000_position"))
            .as_ref()
    }

    pub fn attitude_quaternions(&self) -> Option<&AttitudeQuaternions> {
        self.attitude_quaternions
            .get_or_init(|| self.node.parse("attitude_quaternions"))
            .as_ref()
    }

    /// URL of the picture in the EPIC archive. The API doesn't tell which collection an image
    /// belongs to, so it has to be given again.
    pub fn archive_url(&self, collection: Collection, format: ImageFormat) -> Option<String> {
        let date = self.date()?;
        let (dir, ext) = match format {
            ImageFormat::Png => ("png", "png"),
            ImageFormat::Jpg => ("jpg", "jpg"),
            ImageFormat::Thumbnail => ("thumbs", "jpg"),
        };

        Some(format!(
            "{}/{}/{:04}/{:02}/{:02}/{}/{}.{}",
            ARCHIVE_URL,
            collection,
            date.year(),
            date.month(),
            date.day(),
            dir,
            self.image()?,
            ext
        ))
    }
}

impl Client {
    /// Returns the EPIC pictures of `collection` taken on `date` (`YYYY-MM-DD`), or on the most
    /// recent day with pictures.
    ///
    /// ```no_run
    /// # use nasapi::client::Client;
    /// # use nasapi::epic::{Collection, ImageFormat};
    /// # #[tokio::main]
    /// # async fn main() -> nasapi::error::Result<()> {
    /// let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
    ///
    /// for image in client.epic(Collection::Natural, Some("2019-05-30")).await?.iter() {
    ///     println!("{:?}", image.archive_url(Collection::Natural, ImageFormat::Png));
    /// }
    /// # Ok(()) }
    /// ```
    pub async fn epic(&self, collection: Collection, date: Option<&str>) -> Result<Events<EpicImage>> {
        let options = Options::new().set("collection", collection);

        match date {
            Some(date) => {
                validate_date(date)?;
                self.request(route::EPIC, &options.set("date", date)).await
            }
            None => self.request(route::EPIC_LATEST, &options).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::OneOrMany;
    use mockito::{mock, Matcher};

    #[tokio::test]
    async fn epic_of_a_day() {
        let client = Client::new(&mockito::server_url(), "EPIC_DAY").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/EPIC/api/natural/date/2019-05-30?api_key=EPIC_DAY",
            )),
        )
        .with_body(include_str!("mocked/epic_natural_2019-05-30.json"))
        .create();

        let images = client
            .epic(Collection::Natural, Some("2019-05-30"))
            .await
            .unwrap();

        let images = match images.events() {
            OneOrMany::Many(images) => images,
            other => panic!("expected two images, got {:?}", other),
        };

        let first = &images[0];
        assert_eq!(first.identifier(), Some("20190530011359"));
        assert_eq!(first.centroid_coordinates().unwrap().lat, 15.93457);
        assert_eq!(first.attitude_quaternions().unwrap().q3, 0.914646);
        assert!(first.sun_position().unwrap().x < 0.0);
        assert_eq!(
            first.archive_url(Collection::Natural, ImageFormat::Png).as_deref(),
            Some("https://epic.gsfc.nasa.gov/archive/natural/2019/05/30/png/epic_1b_20190530011359.png")
        );
        assert_eq!(
            images[1].archive_url(Collection::Natural, ImageFormat::Thumbnail).as_deref(),
            Some("https://epic.gsfc.nasa.gov/archive/natural/2019/05/30/thumbs/epic_1b_20190530030830.jpg")
        );
    }

    #[tokio::test]
    async fn epic_latest() {
        let client = Client::new(&mockito::server_url(), "EPIC_LATEST").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from("/EPIC/api/enhanced?api_key=EPIC_LATEST")),
        )
        .with_body("[]")
        .create();

        assert!(client
            .epic(Collection::Enhanced, None)
            .await
            .unwrap()
            .is_empty());
    }
}
