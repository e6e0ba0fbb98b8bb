// crates/usezone-core/src/format.rs

//! Display formatting for zone attributes.
//!
//! Every function here is total: whatever the attribute table contained,
//! the result is a printable string. A value that fails to coerce renders
//! as a diagnostic, never as a panic or an error.

use serde::Serialize;

use crate::model::{use_zone_name, AttrValue, ZoneRecord};

pub const NOT_AVAILABLE: &str = "N/A";

fn diagnostic(value: &AttrValue, expected: &str) -> String {
    match value {
        AttrValue::Text(s) => format!("{s} (not {expected})"),
        AttrValue::Flag(b) => format!("{b} (not {expected})"),
        AttrValue::Number(v) => format!("{v} (not {expected})"),
        AttrValue::Missing => NOT_AVAILABLE.to_string(),
    }
}

/// Whole-number percentage, e.g. "80%".
pub fn percent(value: &AttrValue) -> String {
    match value {
        AttrValue::Missing => NOT_AVAILABLE.to_string(),
        AttrValue::Number(v) if v.is_finite() => format!("{}%", *v as i64),
        other => diagnostic(other, "a number"),
    }
}

/// Meters with one decimal, e.g. "1.5m".
pub fn meters(value: &AttrValue) -> String {
    match value {
        AttrValue::Missing => NOT_AVAILABLE.to_string(),
        AttrValue::Number(v) if v.is_finite() => format!("{v:.1}m"),
        other => diagnostic(other, "a number"),
    }
}

/// Whole meters, e.g. "31m".
pub fn whole_meters(value: &AttrValue) -> String {
    match value {
        AttrValue::Missing => NOT_AVAILABLE.to_string(),
        AttrValue::Number(v) if v.is_finite() => format!("{}m", *v as i64),
        other => diagnostic(other, "a number"),
    }
}

/// Whole square meters, e.g. "100m²".
pub fn square_meters(value: &AttrValue) -> String {
    match value {
        AttrValue::Missing => NOT_AVAILABLE.to_string(),
        AttrValue::Number(v) if v.is_finite() => format!("{}m²", *v as i64),
        other => diagnostic(other, "a number"),
    }
}

/// 0/1 district flags.
pub fn yes_no(value: &AttrValue) -> String {
    match value {
        AttrValue::Missing => NOT_AVAILABLE.to_string(),
        AttrValue::Flag(b) => if *b { "yes" } else { "no" }.to_string(),
        AttrValue::Number(v) if *v == 1.0 => "yes".to_string(),
        AttrValue::Number(v) if *v == 0.0 => "no".to_string(),
        other => diagnostic(other, "a 0/1 flag"),
    }
}

/// Use-zone label from the fixed name table; codes outside the table render
/// as "unknown code (N)".
pub fn zone_label(value: &AttrValue) -> String {
    match value {
        AttrValue::Missing => NOT_AVAILABLE.to_string(),
        AttrValue::Number(v) if v.is_finite() => match value.as_code().and_then(use_zone_name) {
            Some(name) => name.to_string(),
            None if v.fract() == 0.0 => format!("unknown code ({})", *v as i64),
            None => format!("unknown code ({v})"),
        },
        other => diagnostic(other, "a zone code"),
    }
}

fn code_text(value: &AttrValue) -> String {
    match value {
        AttrValue::Number(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", *v as i64),
        AttrValue::Number(v) => format!("{v}"),
        AttrValue::Text(s) => s.clone(),
        AttrValue::Flag(b) => b.to_string(),
        AttrValue::Missing => NOT_AVAILABLE.to_string(),
    }
}

/// One rendered result panel for a matched zone.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeCard {
    /// Use-zone label (name table, or the unknown-code fallback).
    pub zone: String,
    /// The raw code as displayed next to the label.
    pub code: String,
    pub rows: Vec<CardRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardRow {
    pub label: &'static str,
    pub value: String,
}

pub fn attribute_card(record: &ZoneRecord) -> AttributeCard {
    let a = &record.attributes;
    AttributeCard {
        zone: zone_label(&a.zone_code),
        code: code_text(&a.zone_code),
        rows: vec![
            CardRow {
                label: "floor-area ratio",
                value: percent(&a.floor_area_ratio),
            },
            CardRow {
                label: "building coverage",
                value: percent(&a.building_coverage),
            },
            CardRow {
                label: "height limit",
                value: whole_meters(&a.height_limit),
            },
            CardRow {
                label: "minimum setback",
                value: meters(&a.setback),
            },
            CardRow {
                label: "minimum lot area",
                value: square_meters(&a.min_lot_area),
            },
            CardRow {
                label: "special floor-area-ratio district",
                value: yes_no(&a.special_far_district),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ZoneAttributes;
    use geo::MultiPolygon;

    #[test]
    fn percentages_render_as_integers() {
        assert_eq!(percent(&AttrValue::Number(80.0)), "80%");
        assert_eq!(percent(&AttrValue::Number(200.0)), "200%");
        assert_eq!(percent(&AttrValue::Missing), "N/A");
    }

    #[test]
    fn coercion_failures_render_a_diagnostic_not_a_panic() {
        let bad = AttrValue::Text("abc".into());
        let shown = percent(&bad);
        assert!(shown.contains("abc"), "raw value kept: {shown}");
        assert!(shown.contains("not a number"));

        assert_eq!(percent(&AttrValue::Number(f64::NAN)).contains('%'), false);
    }

    #[test]
    fn known_codes_map_to_names() {
        assert_eq!(zone_label(&AttrValue::Number(9.0)), "商業地域");
        assert_eq!(zone_label(&AttrValue::Number(1.0)), "第1種低層住居専用地域");
    }

    #[test]
    fn unknown_codes_render_as_unknown() {
        assert_eq!(zone_label(&AttrValue::Number(99.0)), "unknown code (99)");
        assert_eq!(zone_label(&AttrValue::Number(9.5)), "unknown code (9.5)");
        assert_eq!(zone_label(&AttrValue::Missing), "N/A");
    }

    #[test]
    fn flags_accept_both_numbers_and_booleans() {
        assert_eq!(yes_no(&AttrValue::Number(1.0)), "yes");
        assert_eq!(yes_no(&AttrValue::Number(0.0)), "no");
        assert_eq!(yes_no(&AttrValue::Flag(true)), "yes");
        assert_eq!(yes_no(&AttrValue::Missing), "N/A");
        assert!(yes_no(&AttrValue::Number(2.0)).contains("not a 0/1 flag"));
    }

    #[test]
    fn cards_are_total_over_empty_attributes() {
        let record = ZoneRecord {
            geometry: MultiPolygon::new(vec![]),
            attributes: ZoneAttributes::empty(),
        };
        let card = attribute_card(&record);
        assert_eq!(card.zone, "N/A");
        assert_eq!(card.rows.len(), 6);
        assert!(card.rows.iter().all(|row| row.value == "N/A"));
    }
}
