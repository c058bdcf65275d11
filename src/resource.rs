//! Read-only views over API responses.
//!
//! Every response is kept as the JSON it was received as. Typed accessors read from it on demand,
//! and derived values (parsed timestamps, nested objects, lists of nested objects) are computed on
//! first access and cached in the instance for the rest of its lifetime. The backing JSON never
//! changes, so nothing is ever invalidated.

use super::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::ops::Deref;
use std::sync::OnceLock;

/// A JSON object with typed field extractors.
#[derive(Debug, Clone, PartialEq)]
pub struct Node(JsonValue);

impl Node {
    pub fn new(value: JsonValue) -> Self {
        Node(value)
    }

    /// The raw value of a field. `null` is reported as missing.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(JsonValue::as_str)
    }

    /// Integers are sometimes sent as strings (`"id": "2465633"`); both forms are accepted.
    pub fn i64(&self, key: &str) -> Option<i64> {
        self.get(key)
            .and_then(|v| v.as_i64().or_else(|| v.as_str()?.trim().parse().ok()))
    }

    pub fn u64(&self, key: &str) -> Option<u64> {
        self.get(key)
            .and_then(|v| v.as_u64().or_else(|| v.as_str()?.trim().parse().ok()))
    }

    /// Floats are sometimes sent as strings (`"eccentricity": ".2370"`); both forms are accepted.
    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(|v| v.as_f64().or_else(|| v.as_str()?.trim().parse().ok()))
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(JsonValue::as_bool)
    }

    pub fn json(&self, key: &str) -> Option<&JsonValue> {
        self.get(key)
    }

    /// Deserializes a field into a plain value type.
    pub fn parse<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Builds the view of a nested object.
    pub fn child<T: View>(&self, key: &str) -> Option<T> {
        self.get(key)
            .filter(|v| v.is_object())
            .map(|v| T::from_node(Node(v.clone())))
    }

    /// Builds the views of a nested list of objects, collapsed with [`OneOrMany::collect`].
    pub fn many<T: View>(&self, key: &str) -> OneOrMany<T> {
        self.many_with(key, |v| Some(T::from_node(Node(v.clone()))))
    }

    /// Like [`Node::many`], mapping every element with `f`. Elements for which `f` returns `None`
    /// are skipped.
    pub fn many_with<T, F>(&self, key: &str, f: F) -> OneOrMany<T>
    where
        F: FnMut(&JsonValue) -> Option<T>,
    {
        match self.get(key) {
            Some(JsonValue::Array(items)) => OneOrMany::collect(items.iter().filter_map(f)),
            Some(v @ JsonValue::Object(_)) => OneOrMany::collect(std::iter::once(v).filter_map(f)),
            _ => OneOrMany::Empty,
        }
    }

    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_json(self) -> JsonValue {
        self.0
    }
}

/// A typed view built over a [`Node`].
pub trait View: Sized {
    fn from_node(node: Node) -> Self;

    fn node(&self) -> &Node;

    /// The JSON this view was built from.
    fn to_json(&self) -> &JsonValue {
        self.node().as_json()
    }
}

/// Zero, one or several values.
///
/// Plural fields of the API collapse their shape depending on how many elements they hold: an
/// empty (or missing) list is [`Empty`](OneOrMany::Empty), a single element is
/// [`Single`](OneOrMany::Single) and anything else is [`Many`](OneOrMany::Many).
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    Empty,
    Single(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn collect<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut items: Vec<T> = iter.into_iter().collect();

        match items.len() {
            0 => OneOrMany::Empty,
            1 => match items.pop() {
                Some(item) => OneOrMany::Single(item),
                None => OneOrMany::Empty,
            },
            _ => OneOrMany::Many(items),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, OneOrMany::Empty)
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::Empty => &[],
            OneOrMany::Single(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// The value, if there is exactly one.
    pub fn single(&self) -> Option<&T> {
        match self {
            OneOrMany::Single(item) => Some(item),
            _ => None,
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Empty => Vec::new(),
            OneOrMany::Single(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Empty
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Generates one accessor per `name: kind = "sourceKey"` entry of a [`view!`] table.
macro_rules! getter {
    ($(#[$m:meta])* $field:ident: str = $key:literal) => {
        $(#[$m])*
        pub fn $field(&self) -> Option<&str> {
            self.node.str($key)
        }
    };
    ($(#[$m:meta])* $field:ident: i64 = $key:literal) => {
        $(#[$m])*
        pub fn $field(&self) -> Option<i64> {
            self.node.i64($key)
        }
    };
    ($(#[$m:meta])* $field:ident: u64 = $key:literal) => {
        $(#[$m])*
        pub fn $field(&self) -> Option<u64> {
            self.node.u64($key)
        }
    };
    ($(#[$m:meta])* $field:ident: f64 = $key:literal) => {
        $(#[$m])*
        pub fn $field(&self) -> Option<f64> {
            self.node.f64($key)
        }
    };
    ($(#[$m:meta])* $field:ident: bool = $key:literal) => {
        $(#[$m])*
        pub fn $field(&self) -> Option<bool> {
            self.node.bool($key)
        }
    };
    ($(#[$m:meta])* $field:ident: json = $key:literal) => {
        $(#[$m])*
        pub fn $field(&self) -> Option<&::serde_json::Value> {
            self.node.json($key)
        }
    };
}

/// Declares a view type from a table of `accessor: kind = "sourceKey"` entries.
///
/// The optional `cached { ... }` block declares per-instance caches for derived values; the type's
/// own `impl` block fills them with `get_or_init`.
///
/// ```ignore
/// view! {
///     /// A linked DONKI activity.
///     pub struct LinkedEvent {
///         activity_id: str = "activityID",
///     }
/// }
/// ```
macro_rules! view {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident: $kind:ident = $key:literal,
            )*
        }
        $(
            cached {
                $( $cfield:ident: $cty:ty, )*
            }
        )?
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            node: $crate::resource::Node,
            $( $( $cfield: ::std::sync::OnceLock<$cty>, )* )?
        }

        impl $crate::resource::View for $name {
            fn from_node(node: $crate::resource::Node) -> Self {
                $name {
                    node,
                    $( $( $cfield: ::std::sync::OnceLock::new(), )* )?
                }
            }

            fn node(&self) -> &$crate::resource::Node {
                &self.node
            }
        }

        impl $name {
            $( $crate::resource::getter!($(#[$fmeta])* $field: $kind = $key); )*
        }
    };
}

pub(crate) use getter;
pub(crate) use view;

/// Where a response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    /// HTTP status code of the response.
    pub code: u16,
    /// The URL that was queried, including the API key.
    pub query_url: String,
    /// Name of the route that produced the response.
    pub route: &'static str,
}

/// A parsed response body and its origin, handed to [`FromPayload`].
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub data: JsonValue,
    pub meta: ResponseMeta,
}

/// Types a route's response can be turned into.
pub trait FromPayload: Sized {
    fn from_payload(payload: Payload) -> Result<Self>;
}

/// Root of a response whose body is a single JSON object. Derefs to the view of that object.
#[derive(Debug)]
pub struct Root<T> {
    meta: ResponseMeta,
    inner: T,
}

impl<T: View> Root<T> {
    pub fn code(&self) -> u16 {
        self.meta.code
    }

    pub fn query_url(&self) -> &str {
        &self.meta.query_url
    }

    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    /// The response body, exactly as received.
    pub fn to_json(&self) -> &JsonValue {
        self.inner.to_json()
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Deref for Root<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: View> FromPayload for Root<T> {
    fn from_payload(payload: Payload) -> Result<Self> {
        if !payload.data.is_object() {
            return Err(Error::Resource(format!(
                "route {} returned {} instead of an object",
                payload.meta.route,
                json_kind(&payload.data)
            )));
        }

        Ok(Root {
            inner: T::from_node(Node::new(payload.data)),
            meta: payload.meta,
        })
    }
}

/// Root of a response whose body is a JSON list, such as DONKI event searches.
#[derive(Debug)]
pub struct Events<T> {
    meta: ResponseMeta,
    data: JsonValue,
    events: OnceLock<OneOrMany<T>>,
}

impl<T: View> Events<T> {
    /// The events of the response, materialized on first access.
    pub fn events(&self) -> &OneOrMany<T> {
        self.events.get_or_init(|| match &self.data {
            JsonValue::Array(items) => OneOrMany::collect(
                items
                    .iter()
                    .filter(|v| v.is_object())
                    .map(|v| T::from_node(Node::new(v.clone()))),
            ),
            _ => OneOrMany::Empty,
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.events().iter()
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }

    pub fn code(&self) -> u16 {
        self.meta.code
    }

    pub fn query_url(&self) -> &str {
        &self.meta.query_url
    }

    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    /// The response body, exactly as received.
    pub fn to_json(&self) -> &JsonValue {
        &self.data
    }
}

impl<T: View> FromPayload for Events<T> {
    fn from_payload(payload: Payload) -> Result<Self> {
        // An empty body means there was nothing to report.
        if !(payload.data.is_array() || payload.data.is_null()) {
            return Err(Error::Resource(format!(
                "route {} returned {} instead of a list",
                payload.meta.route,
                json_kind(&payload.data)
            )));
        }

        Ok(Events {
            meta: payload.meta,
            data: payload.data,
            events: OnceLock::new(),
        })
    }
}

impl FromPayload for JsonValue {
    fn from_payload(payload: Payload) -> Result<Self> {
        Ok(payload.data)
    }
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "nothing",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}
