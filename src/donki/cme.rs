use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{date_range, leaves, time, Impact, Instrument, LinkedEvent};
use crate::client::Client;
use crate::error::Result;
use crate::query::Options;
use crate::resource::{view, Events, OneOrMany};
use crate::route;
use crate::utils::validate_dates;

view! {
    /// A WSA-ENLIL simulation run for a CME analysis.
    pub struct EnlilRun {
        model_completion_time_str: str = "modelCompletionTime",
        au: f64 = "au",
        estimated_shock_arrival_time_str: str = "estimatedShockArrivalTime",
        /// In hours.
        estimated_duration: f64 = "estimatedDuration",
        rmin_re: f64 = "rmin_re",
        kp_18: f64 = "kp_18",
        kp_90: f64 = "kp_90",
        kp_135: f64 = "kp_135",
        kp_180: f64 = "kp_180",
        is_earth_glancing_blow: bool = "isEarthGB",
        link: str = "link",
    }
    cached {
        model_completion_time: Option<DateTime<Utc>>,
        estimated_shock_arrival_time: Option<DateTime<Utc>>,
        impacts: OneOrMany<Impact>,
        cme_ids: Vec<String>,
    }
}

impl EnlilRun {
    pub fn model_completion_time(&self) -> Option<DateTime<Utc>> {
        *self
            .model_completion_time
            .get_or_init(|| time(&self.node, "modelCompletionTime"))
    }

    pub fn estimated_shock_arrival_time(&self) -> Option<DateTime<Utc>> {
        *self
            .estimated_shock_arrival_time
            .get_or_init(|| time(&self.node, "estimatedShockArrivalTime"))
    }

    pub fn impacts(&self) -> &OneOrMany<Impact> {
        self.impacts.get_or_init(|| self.node.many("impactList"))
    }

    /// The CMEs the simulation was run for.
    pub fn cme_ids(&self) -> &[String] {
        self.cme_ids
            .get_or_init(|| self.node.parse("cmeIDs").unwrap_or_default())
    }
}

view! {
    /// A measurement of the direction and speed of a CME.
    pub struct CmeAnalysis {
        time21_5_str: str = "time21_5",
        latitude: f64 = "latitude",
        longitude: f64 = "longitude",
        half_angle: f64 = "halfAngle",
        /// In km/s.
        speed: f64 = "speed",
        /// `S`, `C`, `O`, `R` or `ER`: the speed class of the CME.
        kind: str = "type",
        is_most_accurate: bool = "isMostAccurate",
        /// Only sent by [`Client::cme_analysis`].
        associated_cme_id: str = "associatedCMEID",
        catalog: str = "catalog",
        level_of_data: u64 = "levelOfData",
        note: str = "note",
        link: str = "link",
    }
    cached {
        time21_5: Option<DateTime<Utc>>,
        enlil_runs: OneOrMany<EnlilRun>,
    }
}

impl CmeAnalysis {
    /// When the CME reached 21.5 solar radii.
    pub fn time21_5(&self) -> Option<DateTime<Utc>> {
        *self.time21_5.get_or_init(|| time(&self.node, "time21_5"))
    }

    pub fn enlil_runs(&self) -> &OneOrMany<EnlilRun> {
        self.enlil_runs.get_or_init(|| self.node.many("enlilList"))
    }
}

view! {
    /// A coronal mass ejection.
    pub struct Cme {
        activity_id: str = "activityID",
        catalog: str = "catalog",
        start_time_str: str = "startTime",
        source_location: str = "sourceLocation",
        active_region_num: u64 = "activeRegionNum",
        link: str = "link",
        note: str = "note",
    }
    cached {
        start_time: Option<DateTime<Utc>>,
        instruments: OneOrMany<Instrument>,
        linked_events: OneOrMany<LinkedEvent>,
        analyses: OneOrMany<CmeAnalysis>,
    }
}

impl Cme {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        *self.start_time.get_or_init(|| time(&self.node, "startTime"))
    }

    pub fn instruments(&self) -> &OneOrMany<Instrument> {
        self.instruments
            .get_or_init(|| leaves(&self.node, "instruments"))
    }

    pub fn linked_events(&self) -> &OneOrMany<LinkedEvent> {
        self.linked_events
            .get_or_init(|| leaves(&self.node, "linkedEvents"))
    }

    pub fn analyses(&self) -> &OneOrMany<CmeAnalysis> {
        self.analyses.get_or_init(|| self.node.many("cmeAnalyses"))
    }

    /// The analysis flagged as the most accurate, if any.
    pub fn most_accurate_analysis(&self) -> Option<&CmeAnalysis> {
        self.analyses()
            .iter()
            .find(|a| a.is_most_accurate() == Some(true))
    }
}

/// Catalog a CME or IPS search is restricted to.
#[derive(Debug, PartialEq, Eq, Serialize, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Catalog {
    All,
    SwrcCatalog,
    /// CME analyses only.
    JangEtAlCatalog,
    /// IPS only.
    WinslowMessengerIcmeCatalog,
}

/// A search query returning [`CmeAnalysis`] instances.
///
/// ```
/// # use nasapi::donki::{CmeAnalysisQuery, Catalog};
/// let query = CmeAnalysisQuery::new()
///     .start_date("2016-09-01")
///     .end_date("2016-09-30")
///     .most_accurate_only(true)
///     .speed(500)
///     .catalog(Catalog::All);
/// ```
#[derive(Default, Debug, PartialEq, Eq, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CmeAnalysisQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    most_accurate_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    complete_entry_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    half_angle: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    catalog: Option<Catalog>,

    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<String>,
}

impl CmeAnalysisQuery {
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

    pub fn most_accurate_only<T: Into<Option<bool>>>(mut self, only: T) -> Self {
        self.most_accurate_only = only.into();
        self
    }

    pub fn complete_entry_only<T: Into<Option<bool>>>(mut self, only: T) -> Self {
        self.complete_entry_only = only.into();
        self
    }

    /// Lower limit of the speed, in km/s.
    pub fn speed<T: Into<Option<u32>>>(mut self, speed: T) -> Self {
        self.speed = speed.into();
        self
    }

    /// Lower limit of the half angle, in degrees.
    pub fn half_angle<T: Into<Option<u32>>>(mut self, half_angle: T) -> Self {
        self.half_angle = half_angle.into();
        self
    }

    pub fn catalog<T: Into<Option<Catalog>>>(mut self, catalog: T) -> Self {
        self.catalog = catalog.into();
        self
    }

    /// Match analyses whose note contains `keyword`, such as `swpc_annex`.
    pub fn keyword<T: Into<Option<S>>, S: Into<String>>(mut self, keyword: T) -> Self {
        self.keyword = keyword.into().map(Into::into);
        self
    }
}

impl Client {
    /// Returns the coronal mass ejections that started between `start_date` and `end_date`.
    ///
    /// ```no_run
    /// # use nasapi::client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> nasapi::error::Result<()> {
    /// let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
    ///
    /// for cme in client.cme(Some("2016-09-01"), Some("2016-09-30")).await?.iter() {
    ///     println!("{:?}: {} analyses", cme.activity_id(), cme.analyses().len());
    /// }
    /// # Ok(()) }
    /// ```
    pub async fn cme(&self, start_date: Option<&str>, end_date: Option<&str>) -> Result<Events<Cme>> {
        self.request(route::CME, &date_range(start_date, end_date)?)
            .await
    }

    /// Returns the CME analyses matching the search query.
    pub async fn cme_analysis(&self, query: &CmeAnalysisQuery) -> Result<Events<CmeAnalysis>> {
        validate_dates([query.start_date.as_deref(), query.end_date.as_deref()])?;

        self.request(route::CME_ANALYSIS, &Options::from_query(query)?)
            .await
    }
}
