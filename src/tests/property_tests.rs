// src/tests/property_tests.rs

//! tests for `src/data/property.rs`

#![allow(non_snake_case)]

use crate::data::property::{Properties, Property, PropertyMap, PropertyType, PropertyValue};

use ::test_case::test_case;

#[test]
fn test_Property_string() {
    let p = Property::string("host", "a.com");
    assert_eq!(p.name(), "host");
    assert_eq!(p.property_type(), PropertyType::String);
    assert_eq!(p.value(), Some(&PropertyValue::String(String::from("a.com"))));
    assert!(!p.is_null());
    assert_eq!(p.to_string(), "host=a.com");
}

#[test]
fn test_Property_null() {
    let p = Property::null("bytesSent", PropertyType::Long);
    assert!(p.is_null());
    assert_eq!(p.property_type(), PropertyType::Long);
    assert_eq!(p.to_string(), "bytesSent=");
}

#[test_case(PropertyType::Integer, PropertyValue::Integer(1))]
#[test_case(PropertyType::Long, PropertyValue::Long(1))]
#[test_case(PropertyType::Float, PropertyValue::Float(1.5))]
#[test_case(PropertyType::Double, PropertyValue::Double(1.5))]
#[test_case(PropertyType::Map, PropertyValue::Map(PropertyMap::new()))]
fn test_Property_new_type_matches(
    property_type: PropertyType,
    value: PropertyValue,
) {
    let p = Property::new("x", property_type, Some(value));
    assert_eq!(p.property_type(), property_type);
}

#[test]
#[should_panic]
fn test_Property_new_type_mismatch() {
    Property::new("x", PropertyType::Integer, Some(PropertyValue::Long(1)));
}

#[test]
#[should_panic]
fn test_Property_new_type_mismatch_string() {
    Property::new("x", PropertyType::Date, Some(PropertyValue::String(String::from("2000"))));
}

#[test]
fn test_Property_ordering_by_name() {
    let mut properties: Properties = vec![
        Property::string("c", "1"),
        Property::null("a", PropertyType::Long),
        Property::new("b", PropertyType::Integer, Some(PropertyValue::Integer(2))),
    ];
    properties.sort();
    let names: Vec<&str> = properties
        .iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_Property_eq_by_name() {
    assert_eq!(Property::string("a", "1"), Property::string("a", "2"));
    assert_ne!(Property::string("a", "1"), Property::string("b", "1"));
}

#[test]
fn test_PropertyValue_Map_display() {
    let mut map = PropertyMap::new();
    map.insert(String::from("b"), String::from("2"));
    map.insert(String::from("a"), String::from("1"));
    assert_eq!(PropertyValue::Map(map).to_string(), "{a=1, b=2}");
}

#[test_case(PropertyValue::String(String::from("s")), PropertyType::String)]
#[test_case(PropertyValue::Integer(-1), PropertyType::Integer)]
#[test_case(PropertyValue::Long(1), PropertyType::Long)]
#[test_case(PropertyValue::Float(0.5), PropertyType::Float)]
#[test_case(PropertyValue::Double(0.5), PropertyType::Double)]
fn test_PropertyValue_property_type(
    value: PropertyValue,
    expect: PropertyType,
) {
    assert_eq!(value.property_type(), expect);
}
