//! Named-route URL generation.
//!
//! ```
//! use micro_route::{RouteRecord, RouteTable};
//!
//! let table = RouteTable::new(None, vec![RouteRecord::default().with("path", "/posts/$").with("name", "posts.show")]);
//! assert_eq!(table.route("posts.show", &["hello world".into()]).unwrap(), "/posts/hello%20world");
//! ```

use crate::error::ReverseError;
use crate::matcher::split_path;
use crate::table::{RouteTable, WILDCARD};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except unreserved characters (`A-Z a-z 0-9 - _ . ~`) is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// A positional value substituted for a `$` segment.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteParam {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null,
}

impl RouteParam {
    /// The textual form before escaping; booleans render as `1` / `0`, null has none.
    fn render(&self) -> Option<String> {
        match self {
            Self::Str(value) => Some(value.clone()),
            Self::Int(value) => Some(value.to_string()),
            Self::UInt(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Bool(value) => Some(if *value { "1" } else { "0" }.to_string()),
            Self::Null => None,
        }
    }
}

impl From<&str> for RouteParam {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for RouteParam {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for RouteParam {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for RouteParam {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for RouteParam {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for RouteParam {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<RouteParam>> From<Option<T>> for RouteParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! route_param_from_int {
    ($variant:ident, $target:ty, $($ty:ty),+) => {
        $(
            impl From<$ty> for RouteParam {
                fn from(value: $ty) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

route_param_from_int!(Int, i64, i8, i16, i32, i64);
route_param_from_int!(UInt, u64, u8, u16, u32, u64);

impl From<usize> for RouteParam {
    fn from(value: usize) -> Self {
        Self::UInt(value as u64)
    }
}

impl RouteTable {
    /// Builds the URL of the first route declared with `name`, filling each `$` segment with the
    /// next positional parameter, percent-encoded.
    ///
    /// The parameter count must equal the number of `$` segments exactly.
    pub fn route(&self, name: &str, params: &[RouteParam]) -> Result<String, ReverseError> {
        let record = self.find_named(name).ok_or_else(|| ReverseError::undefined_route(name))?;
        let segments = split_path(record.path().unwrap_or_default());

        let expected = segments.iter().filter(|segment| **segment == WILDCARD).count();
        if expected == 0 && !params.is_empty() {
            return Err(ReverseError::UnexpectedParams { name: name.to_string(), given: params.len() });
        }
        if params.len() > expected {
            return Err(ReverseError::TooManyParams { name: name.to_string(), expected, given: params.len() });
        }

        let given = params.len();
        let mut params = params.iter().enumerate();
        let mut rendered = Vec::with_capacity(segments.len());

        for segment in segments {
            if segment != WILDCARD {
                rendered.push(segment.to_string());
                continue;
            }

            let Some((index, param)) = params.next() else {
                return Err(ReverseError::MissingParam { name: name.to_string(), index: given });
            };
            let value = param.render().ok_or_else(|| ReverseError::NullParam { name: name.to_string(), index })?;
            rendered.push(utf8_percent_encode(&value, SEGMENT).to_string());
        }

        Ok(format!("/{}", rendered.join("/")))
    }
}
