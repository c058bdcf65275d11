use super::error::{Error, Result};
use super::query::Options;

pub const APOD: &str = "apod";
pub const NEO_FEED: &str = "neo-feed";
pub const NEO_LOOKUP: &str = "neo-lookup";
pub const NEO_BROWSE: &str = "neo-browse";
pub const CME: &str = "cme";
pub const CME_ANALYSIS: &str = "cme-analysis";
pub const GST: &str = "gst";
pub const IPS: &str = "ips";
pub const FLR: &str = "flr";
pub const SEP: &str = "sep";
pub const MPC: &str = "mpc";
pub const RBE: &str = "rbe";
pub const HSS: &str = "hss";
pub const WSA_ENLIL: &str = "wsa-enlil";
pub const NOTIFICATIONS: &str = "notifications";
pub const MARS_PHOTOS: &str = "mars-photos";
pub const MARS_LATEST_PHOTOS: &str = "mars-latest-photos";
pub const MARS_MANIFEST: &str = "mars-manifest";
pub const EPIC: &str = "epic";
pub const EPIC_LATEST: &str = "epic-latest";
pub const EARTH_ASSETS: &str = "earth-assets";

const DONKI_DATES: &[&str] = &["startDate", "endDate"];

/// A logical endpoint of the API: its path template and the query parameters it accepts.
///
/// Path templates may contain `{placeholder}` segments, filled from the request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub query_keys: &'static [&'static str],
}

static ROUTES: &[Route] = &[
    Route {
        name: APOD,
        path: "/planetary/apod",
        query_keys: &[
            "date",
            "hd",
            "concept_tags",
            "count",
            "start_date",
            "end_date",
            "thumbs",
        ],
    },
    Route {
        name: NEO_FEED,
        path: "/neo/rest/v1/feed",
        query_keys: &["start_date", "end_date", "detailed"],
    },
    Route {
        name: NEO_LOOKUP,
        path: "/neo/rest/v1/neo/{asteroid_id}",
        query_keys: &[],
    },
    Route {
        name: NEO_BROWSE,
        path: "/neo/rest/v1/neo/browse",
        query_keys: &["page", "size"],
    },
    Route {
        name: CME,
        path: "/DONKI/CME",
        query_keys: DONKI_DATES,
    },
    Route {
        name: CME_ANALYSIS,
        path: "/DONKI/CMEAnalysis",
        query_keys: &[
            "startDate",
            "endDate",
            "mostAccurateOnly",
            "completeEntryOnly",
            "speed",
            "halfAngle",
            "catalog",
            "keyword",
        ],
    },
    Route {
        name: GST,
        path: "/DONKI/GST",
        query_keys: DONKI_DATES,
    },
    Route {
        name: IPS,
        path: "/DONKI/IPS",
        query_keys: &["startDate", "endDate", "location", "catalog"],
    },
    Route {
        name: FLR,
        path: "/DONKI/FLR",
        query_keys: DONKI_DATES,
    },
    Route {
        name: SEP,
        path: "/DONKI/SEP",
        query_keys: DONKI_DATES,
    },
    Route {
        name: MPC,
        path: "/DONKI/MPC",
        query_keys: DONKI_DATES,
    },
    Route {
        name: RBE,
        path: "/DONKI/RBE",
        query_keys: DONKI_DATES,
    },
    Route {
        name: HSS,
        path: "/DONKI/HSS",
        query_keys: DONKI_DATES,
    },
    Route {
        name: WSA_ENLIL,
        path: "/DONKI/WSAEnlilSimulations",
        query_keys: DONKI_DATES,
    },
    Route {
        name: NOTIFICATIONS,
        path: "/DONKI/notifications",
        query_keys: &["startDate", "endDate", "type"],
    },
    Route {
        name: MARS_PHOTOS,
        path: "/mars-photos/api/v1/rovers/{rover}/photos",
        query_keys: &["sol", "earth_date", "camera", "page"],
    },
    Route {
        name: MARS_LATEST_PHOTOS,
        path: "/mars-photos/api/v1/rovers/{rover}/latest_photos",
        query_keys: &[],
    },
    Route {
        name: MARS_MANIFEST,
        path: "/mars-photos/api/v1/manifests/{rover}",
        query_keys: &[],
    },
    Route {
        name: EPIC,
        path: "/EPIC/api/{collection}/date/{date}",
        query_keys: &[],
    },
    Route {
        name: EPIC_LATEST,
        path: "/EPIC/api/{collection}",
        query_keys: &[],
    },
    Route {
        name: EARTH_ASSETS,
        path: "/planetary/earth/assets",
        query_keys: &["lon", "lat", "date", "dim"],
    },
];

impl Route {
    /// Finds a route by name.
    pub fn lookup(name: &str) -> Option<&'static Route> {
        ROUTES.iter().find(|r| r.name == name)
    }

    /// Every known route.
    pub fn all() -> &'static [Route] {
        ROUTES
    }

    /// Whether `key` is accepted in the query string of this route.
    pub fn permits(&self, key: &str) -> bool {
        self.query_keys.contains(&key)
    }

    /// Names of the `{placeholder}` segments of the path template.
    pub fn placeholders(&self) -> impl Iterator<Item = &'static str> {
        self.path
            .split('/')
            .filter_map(|seg| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
    }

    /// Fills the path template from `options`.
    pub fn render_path(&self, options: &Options) -> Result<String> {
        self.path
            .split('/')
            .map(|seg| {
                match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    None => Ok(seg.to_string()),
                    Some(name) => options
                        .get(name)
                        .map(urlencoding::encode)
                        .ok_or_else(|| Error::MissingParameter {
                            route: self.name.to_string(),
                            name: name.to_string(),
                        }),
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(|segments| segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        let apod = Route::lookup("apod").unwrap();
        assert_eq!(apod.path, "/planetary/apod");
        assert!(apod.permits("hd"));
        assert!(!apod.permits("api_key"));

        assert!(Route::lookup("nope").is_none());
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in Route::all().iter().enumerate() {
            assert!(Route::all()[i + 1..].iter().all(|b| b.name != a.name));
        }
    }

    #[test]
    fn render_path_fills_placeholders() {
        let route = Route::lookup(EPIC).unwrap();
        assert_eq!(
            route.placeholders().collect::<Vec<_>>(),
            vec!["collection", "date"]
        );

        let options = Options::new()
            .set("collection", "natural")
            .set("date", "2019-05-30");
        assert_eq!(
            route.render_path(&options).unwrap(),
            "/EPIC/api/natural/date/2019-05-30"
        );
    }

    #[test]
    fn render_path_encodes_values() {
        let route = Route::lookup(NEO_LOOKUP).unwrap();
        let options = Options::new().set("asteroid_id", "a b/c");
        assert_eq!(
            route.render_path(&options).unwrap(),
            "/neo/rest/v1/neo/a%20b%2Fc"
        );
    }

    #[test]
    fn render_path_requires_placeholders() {
        let route = Route::lookup(MARS_MANIFEST).unwrap();
        match route.render_path(&Options::new()) {
            Err(Error::MissingParameter { route, name }) => {
                assert_eq!(route, MARS_MANIFEST);
                assert_eq!(name, "rover");
            }
            other => panic!("expected a missing parameter, got {:?}", other),
        }
    }
}
