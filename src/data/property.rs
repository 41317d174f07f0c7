// src/data/property.rs

//! Implement [`Property`], the named and typed value carried by a
//! [`GenericEvent`].
//!
//! [`GenericEvent`]: crate::data::event::GenericEvent

use crate::data::datetime::DateTimeL;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PropertyType, PropertyValue
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Map of string keys to string values, e.g. parsed cookies.
pub type PropertyMap = BTreeMap<String, String>;

/// The declared type of a [`Property`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PropertyType {
    String,
    Integer,
    Long,
    Float,
    Double,
    Date,
    Map,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s: &str = match self {
            PropertyType::String => "String",
            PropertyType::Integer => "Integer",
            PropertyType::Long => "Long",
            PropertyType::Float => "Float",
            PropertyType::Double => "Double",
            PropertyType::Date => "Date",
            PropertyType::Map => "Map",
        };
        write!(f, "{}", s)
    }
}

/// A [`Property`] value. Each variant corresponds to one [`PropertyType`].
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    String(String),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Date(DateTimeL),
    Map(PropertyMap),
}

impl PropertyValue {
    /// The [`PropertyType`] matching this value.
    pub const fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Integer(_) => PropertyType::Integer,
            PropertyValue::Long(_) => PropertyType::Long,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Double(_) => PropertyType::Double,
            PropertyValue::Date(_) => PropertyType::Date,
            PropertyValue::Map(_) => PropertyType::Map,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Long(l) => write!(f, "{}", l),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Double(v) => write!(f, "{}", v),
            PropertyValue::Date(dt) => write!(f, "{}", dt.to_rfc3339()),
            PropertyValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Property
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A named, typed, nullable value.
///
/// A `Property` is ordered and compared by `name` only. Within one
/// [`GenericEvent`] names are unique so this gives a deterministic display
/// order.
///
/// [`GenericEvent`]: crate::data::event::GenericEvent
#[derive(Clone, Debug)]
pub struct Property {
    name: String,
    property_type: PropertyType,
    value: Option<PropertyValue>,
}

impl Property {
    /// Create a new `Property`.
    ///
    /// Panics if `value` is not `None` and its type is not `property_type`.
    /// A mismatch is a programming error, not a data error.
    pub fn new(
        name: impl Into<String>,
        property_type: PropertyType,
        value: Option<PropertyValue>,
    ) -> Property {
        let name: String = name.into();
        if let Some(value_) = value.as_ref() {
            assert_eq!(
                value_.property_type(),
                property_type,
                "Property {:?} declared type {} but value {:?} has type {}",
                name,
                property_type,
                value_,
                value_.property_type(),
            );
        }

        Property {
            name,
            property_type,
            value,
        }
    }

    /// Create a `String` property.
    pub fn string(
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Property {
        Property::new(name, PropertyType::String, Some(PropertyValue::String(value.into())))
    }

    /// Create a property of `property_type` with a `null` value.
    pub fn null(
        name: impl Into<String>,
        property_type: PropertyType,
    ) -> Property {
        Property::new(name, property_type, None)
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline(always)]
    pub const fn property_type(&self) -> PropertyType {
        self.property_type
    }

    #[inline(always)]
    pub const fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    #[inline(always)]
    pub const fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => write!(f, "{}=", self.name),
        }
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Property {}

impl PartialOrd for Property {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Property {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// Sequence of [`Property`].
pub type Properties = Vec<Property>;
