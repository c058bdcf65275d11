use chrono::{DateTime, Utc};

use super::{date_range, time, Impact};
use crate::client::Client;
use crate::error::Result;
use crate::resource::{view, Events, OneOrMany};
use crate::route;

view! {
    /// A CME fed into a WSA-ENLIL simulation.
    pub struct CmeInput {
        cme_id: str = "cmeid",
        cme_start_time_str: str = "cmeStartTime",
        time21_5_str: str = "time21_5",
        latitude: f64 = "latitude",
        longitude: f64 = "longitude",
        speed: f64 = "speed",
        half_angle: f64 = "halfAngle",
        is_most_accurate: bool = "isMostAccurate",
        level_of_data: u64 = "levelOfData",
        ips_list: json = "ipsList",
    }
    cached {
        cme_start_time: Option<DateTime<Utc>>,
        time21_5: Option<DateTime<Utc>>,
    }
}

impl CmeInput {
    pub fn cme_start_time(&self) -> Option<DateTime<Utc>> {
        *self
            .cme_start_time
            .get_or_init(|| time(&self.node, "cmeStartTime"))
    }

    /// When the CME reached 21.5 solar radii.
    pub fn time21_5(&self) -> Option<DateTime<Utc>> {
        *self.time21_5.get_or_init(|| time(&self.node, "time21_5"))
    }
}

view! {
    /// A WSA-ENLIL solar wind simulation.
    pub struct WsaEnlilSimulation {
        simulation_id: str = "simulationID",
        model_completion_time_str: str = "modelCompletionTime",
        au: f64 = "au",
        estimated_shock_arrival_time_str: str = "estimatedShockArrivalTime",
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
        cme_inputs: OneOrMany<CmeInput>,
        impacts: OneOrMany<Impact>,
    }
}

impl WsaEnlilSimulation {
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

    pub fn cme_inputs(&self) -> &OneOrMany<CmeInput> {
        self.cme_inputs.get_or_init(|| self.node.many("cmeInputs"))
    }

    pub fn impacts(&self) -> &OneOrMany<Impact> {
        self.impacts.get_or_init(|| self.node.many("impactList"))
    }
}

impl Client {
    /// Returns the WSA-ENLIL simulations completed between `start_date` and `end_date`.
    pub async fn wsa_enlil(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Events<WsaEnlilSimulation>> {
        self.request(route::WSA_ENLIL, &date_range(start_date, end_date)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use mockito::{mock, Matcher};

    #[tokio::test]
    async fn wsa_enlil_search() {
        let client = Client::new(&mockito::server_url(), "DONKI_WSA").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/DONKI/WSAEnlilSimulations?api_key=DONKI_WSA&endDate=2016-01-07&startDate=2016-01-06",
            )),
        )
        .with_body(include_str!("../mocked/donki_wsa_enlil.json"))
        .create();

        let simulations = client
            .wsa_enlil(Some("2016-01-06"), Some("2016-01-07"))
            .await
            .unwrap();
        let simulation = simulations.events().single().unwrap();

        assert_eq!(simulation.simulation_id(), Some("WSA-ENLIL/10190/1"));
        assert_eq!(simulation.model_completion_time().unwrap().hour(), 14);
        assert_eq!(simulation.kp_90(), None);

        let input = simulation.cme_inputs().single().unwrap();
        assert_eq!(input.cme_id(), Some("2016-01-06T14:24:00-CME-001"));
        assert_eq!(input.speed(), Some(1100.0));
        assert_eq!(input.time21_5().unwrap().minute(), 52);

        assert_eq!(
            simulation
                .impacts()
                .iter()
                .filter(|i| i.is_glancing_blow() == Some(true))
                .filter_map(Impact::location)
                .collect::<Vec<_>>(),
            vec!["Spitzer"]
        );
    }
}
