use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::client::Client;
use crate::error::Result;
use crate::query::Options;
use crate::resource::{view, OneOrMany, Root};
use crate::route;
use crate::utils::{parse_date, validate_dates};

/// A Mars rover with photos in the API.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Rover {
    Curiosity,
    Opportunity,
    Spirit,
    Perseverance,
}

impl fmt::Display for Rover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rover::Curiosity => "curiosity",
            Rover::Opportunity => "opportunity",
            Rover::Spirit => "spirit",
            Rover::Perseverance => "perseverance",
        })
    }
}

#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct Camera {
    pub id: u64,
    /// Short name, such as `FHAZ`.
    pub name: String,
    pub rover_id: u64,
    pub full_name: String,
}

/// The rover a [`Photo`] was taken by.
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct RoverInfo {
    pub id: u64,
    pub name: String,
    pub landing_date: NaiveDate,
    pub launch_date: NaiveDate,
    pub status: String,
}

view! {
    pub struct Photo {
        id: u64 = "id",
        sol: u64 = "sol",
        img_src: str = "img_src",
        earth_date_str: str = "earth_date",
    }
    cached {
        earth_date: Option<NaiveDate>,
        camera: Option<Camera>,
        rover: Option<RoverInfo>,
    }
}

impl Photo {
    pub fn earth_date(&self) -> Option<NaiveDate> {
        *self
            .earth_date
            .get_or_init(|| self.earth_date_str().and_then(parse_date))
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.get_or_init(|| self.node.parse("camera")).as_ref()
    }

    pub fn rover(&self) -> Option<&RoverInfo> {
        self.rover.get_or_init(|| self.node.parse("rover")).as_ref()
    }
}

view! {
    /// Photos returned by a search or by [`Client::mars_latest_photos`].
    pub struct MarsPhotos {}
    cached {
        photos: OneOrMany<Photo>,
    }
}

impl MarsPhotos {
    pub fn photos(&self) -> &OneOrMany<Photo> {
        self.photos.get_or_init(|| {
            if self.node.get("latest_photos").is_some() {
                self.node.many("latest_photos")
            } else {
                self.node.many("photos")
            }
        })
    }
}

/// Photos taken on one sol, in a [`PhotoManifest`].
#[derive(Debug, PartialEq, Eq, Deserialize, Clone)]
pub struct SolSummary {
    pub sol: u64,
    pub earth_date: NaiveDate,
    pub total_photos: u64,
    pub cameras: Vec<String>,
}

view! {
    /// The mission of a rover and the photos it took, sol by sol.
    pub struct PhotoManifest {
        name: str = "name",
        landing_date_str: str = "landing_date",
        launch_date_str: str = "launch_date",
        status: str = "status",
        max_sol: u64 = "max_sol",
        max_date_str: str = "max_date",
        total_photos: u64 = "total_photos",
    }
    cached {
        landing_date: Option<NaiveDate>,
        launch_date: Option<NaiveDate>,
        max_date: Option<NaiveDate>,
        sols: OneOrMany<SolSummary>,
    }
}

impl PhotoManifest {
    pub fn landing_date(&self) -> Option<NaiveDate> {
        *self
            .landing_date
            .get_or_init(|| self.landing_date_str().and_then(parse_date))
    }

    pub fn launch_date(&self) -> Option<NaiveDate> {
        *self
            .launch_date
            .get_or_init(|| self.launch_date_str().and_then(parse_date))
    }

    /// Earth date of the last sol with photos.
    pub fn max_date(&self) -> Option<NaiveDate> {
        *self
            .max_date
            .get_or_init(|| self.max_date_str().and_then(parse_date))
    }

    pub fn sols(&self) -> &OneOrMany<SolSummary> {
        self.sols.get_or_init(|| {
            self.node
                .many_with("photos", |v| serde_json::from_value(v.clone()).ok())
        })
    }
}

view! {
    pub struct MarsManifest {}
    cached {
        manifest: Option<PhotoManifest>,
    }
}

impl MarsManifest {
    pub fn manifest(&self) -> Option<&PhotoManifest> {
        self.manifest
            .get_or_init(|| self.node.child("photo_manifest"))
            .as_ref()
    }
}

/// A search query returning [`Photo`] instances.
///
/// ```
/// # use nasapi::mars::MarsPhotosQuery;
/// let query = MarsPhotosQuery::new()
///     .sol(1000)
///     .camera("FHAZ")
///     .page(2);
/// ```
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
pub struct MarsPhotosQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    sol: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    earth_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    camera: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
}

impl MarsPhotosQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Martian day, counted from the landing of the rover.
    pub fn sol<T: Into<Option<u32>>>(mut self, sol: T) -> Self {
        self.sol = sol.into();
        self
    }

    /// Day on Earth, `YYYY-MM-DD`. Ignored by the API when [`Self::sol`] is set.
    pub fn earth_date<T: Into<Option<S>>, S: Into<String>>(mut self, date: T) -> Self {
        self.earth_date = date.into().map(Into::into);
        self
    }

    /// Short name of the camera, such as `FHAZ` or `NAVCAM`.
    pub fn camera<T: Into<Option<S>>, S: Into<String>>(mut self, camera: T) -> Self {
        self.camera = camera.into().map(Into::into);
        self
    }

    /// Page of 25 photos, starting at 1.
    pub fn page<T: Into<Option<u32>>>(mut self, page: T) -> Self {
        self.page = page.into();
        self
    }
}

impl Client {
    /// Returns the photos taken by `rover` matching the search query.
    ///
    /// ```no_run
    /// # use nasapi::client::Client;
    /// # use nasapi::mars::{MarsPhotosQuery, Rover};
    /// # #[tokio::main]
    /// # async fn main() -> nasapi::error::Result<()> {
    /// let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
    /// let result = client
    ///     .mars_photos(Rover::Curiosity, &MarsPhotosQuery::new().sol(1000))
    ///     .await?;
    ///
    /// for photo in result.photos() {
    ///     println!("{:?}", photo.img_src());
    /// }
    /// # Ok(()) }
    /// ```
    pub async fn mars_photos(&self, rover: Rover, query: &MarsPhotosQuery) -> Result<Root<MarsPhotos>> {
        validate_dates([query.earth_date.as_deref()])?;

        let options = Options::from_query(query)?.set("rover", rover);
        self.request(route::MARS_PHOTOS, &options).await
    }

    /// Returns the photos of the last sol `rover` sent photos for.
    pub async fn mars_latest_photos(&self, rover: Rover) -> Result<Root<MarsPhotos>> {
        self.request(
            route::MARS_LATEST_PHOTOS,
            &Options::new().set("rover", rover),
        )
        .await
    }

    /// Returns the mission manifest of `rover`.
    pub async fn mars_manifest(&self, rover: Rover) -> Result<Root<MarsManifest>> {
        self.request(route::MARS_MANIFEST, &Options::new().set("rover", rover))
            .await
    }
}
