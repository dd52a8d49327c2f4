use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{BeamMap, BeamValue, ConfValue, FlatConfig, GroupedConfig};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Beam grouper: FlatConfig → GroupedConfig
// ---------------------------------------------------------------------------

/// A key belonging to a beam: `<name>_<beam char>_<anything>`, where the
/// beam is a single alphanumeric character naming a dispersion order.
static BEAM_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]*_([A-Za-z0-9])_\w").expect("beam key regex"));

/// A stripped key carrying one bound of a range: `<name>_0` or `<name>_1`.
static RANGE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]*)_([01])$").expect("range key regex"));

/// Reorganize a flat configuration into per-beam sub-mappings.
///
/// Beam tokens are uppercased, so `TR_a_0` and `TR_A_1` land in the same
/// group. Within each group the beam token and its leading underscore are
/// stripped from the keys, and `_0`/`_1` pairs collapse into a single
/// [`BeamValue::Range`]. Keys that never match the beam pattern are
/// dropped entirely — callers that need them read the flat mapping.
///
/// Two raw keys can reduce to the same stripped key within a beam; the
/// later one wins and a warning is logged, mirroring the parser's own
/// last-write-wins policy for duplicate lines.
pub fn split_by_beam(flat: &FlatConfig) -> Result<GroupedConfig, ConfigError> {
    let mut beams: Vec<String> = Vec::new();
    let mut groups: BTreeMap<String, BTreeMap<String, ConfValue>> = BTreeMap::new();

    for (key, value) in flat {
        let Some(caps) = BEAM_KEY.captures(key) else {
            continue;
        };
        let raw = &caps[1]; // beam character as written in the file
        let beam = raw.to_ascii_uppercase();
        if !beams.contains(&beam) {
            beams.push(beam.clone());
        }

        let stripped = key.replacen(&format!("_{raw}"), "", 1);
        let entry = groups.entry(beam.clone()).or_default();
        if let Some(old) = entry.insert(stripped.clone(), value.clone()) {
            log::warn!("beam {beam}: {stripped} redefined (was {old}), keeping later value");
        }
    }

    let mut collapsed = BTreeMap::new();
    for (beam, entries) in groups {
        collapsed.insert(beam, collapse_ranges(entries)?);
    }

    Ok(GroupedConfig {
        beams,
        groups: collapsed,
    })
}

/// Collapse `<name>_0` / `<name>_1` pairs into `name -> Range(lo, hi)`,
/// building a fresh map rather than editing the old one in place. A lone
/// `_0` or `_1` stays under its original key.
fn collapse_ranges(entries: BTreeMap<String, ConfValue>) -> Result<BeamMap, ConfigError> {
    let mut sides: BTreeMap<String, [Option<ConfValue>; 2]> = BTreeMap::new();

    for (key, value) in &entries {
        let Some(caps) = RANGE_KEY.captures(key) else {
            continue;
        };
        // The pattern only admits 0 and 1; anything else slipping through
        // bucket assignment is a hard error.
        let side = match &caps[2] {
            "0" => 0,
            "1" => 1,
            _ => {
                return Err(ConfigError::UnexpectedRangeVariable { key: key.clone() });
            }
        };
        sides.entry(caps[1].to_string()).or_default()[side] = Some(value.clone());
    }

    let mut ranges = BTreeMap::new();
    let mut consumed = BTreeSet::new();
    for (root, [lo, hi]) in sides {
        if let (Some(lo), Some(hi)) = (lo, hi) {
            consumed.insert(format!("{root}_0"));
            consumed.insert(format!("{root}_1"));
            ranges.insert(root, BeamValue::Range(lo, hi));
        }
    }

    let mut out = BeamMap::new();
    for (key, value) in entries {
        if !consumed.contains(&key) {
            out.insert(key, BeamValue::Single(value));
        }
    }
    // collapsed ranges win over any plain key that already used the root name
    out.extend(ranges);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::model::Number;

    fn flat(pairs: &[(&str, f64)]) -> FlatConfig {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), ConfValue::Scalar(Number::Float(v))))
            .collect()
    }

    fn scalar(v: f64) -> ConfValue {
        ConfValue::Scalar(Number::Float(v))
    }

    #[test]
    fn discovers_beams_and_collapses_pairs() {
        let flat = flat(&[
            ("DISPX_A_0", 0.1),
            ("DISPX_A_1", 0.2),
            ("DISPY_B_0", -0.1),
        ]);
        let grouped = split_by_beam(&flat).unwrap();

        assert_eq!(grouped.beams, vec!["A", "B"]);
        assert_eq!(
            grouped.get("A").unwrap().get("DISPX"),
            Some(&BeamValue::Range(scalar(0.1), scalar(0.2)))
        );
        // single-sided range stays uncollapsed
        assert_eq!(
            grouped.get("B").unwrap().get("DISPY_0"),
            Some(&BeamValue::Single(scalar(-0.1)))
        );
    }

    #[test]
    fn numeric_beam_tokens_round_trip_ranges() {
        let flat = flat(&[("A_1_0", 1.0), ("A_1_1", 2.0)]);
        let grouped = split_by_beam(&flat).unwrap();
        assert_eq!(grouped.beams, vec!["1"]);
        assert_eq!(
            grouped.get("1").unwrap().get("A"),
            Some(&BeamValue::Range(scalar(1.0), scalar(2.0)))
        );
    }

    #[test]
    fn beam_case_is_normalized() {
        let flat = flat(&[("TR_a_0", 5.0), ("TR_A_1", 6.0)]);
        let grouped = split_by_beam(&flat).unwrap();
        assert_eq!(grouped.beams, vec!["A"]);
        assert_eq!(
            grouped.get("A").unwrap().get("TR"),
            Some(&BeamValue::Range(scalar(5.0), scalar(6.0)))
        );
    }

    #[test]
    fn keys_without_a_beam_token_are_dropped() {
        let flat = flat(&[("FWCPOS_REF", 353.56), ("XOFF_A", 1.0)]);
        let grouped = split_by_beam(&flat).unwrap();
        assert!(grouped.is_empty());
        assert_eq!(grouped.len(), 0);
    }

    #[test]
    fn grouping_is_pure_and_deterministic() {
        let flat = flat(&[("DYDX_A_0", 0.0), ("DYDX_A_1", 1.0), ("DLDP_C_0", 2.2)]);
        let first = split_by_beam(&flat).unwrap();
        let second = split_by_beam(&flat).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn stripped_key_collisions_keep_the_later_value() {
        // Both reduce to DISPX_5 under beam A; the later raw key wins.
        let flat = flat(&[("DISPX_A_5", 1.0), ("DISPX_a_5", 2.0)]);
        let grouped = split_by_beam(&flat).unwrap();
        assert_eq!(
            grouped.get("A").unwrap().get("DISPX_5"),
            Some(&BeamValue::Single(scalar(2.0)))
        );
    }

    #[test]
    fn only_the_beam_segment_is_stripped() {
        // Removing the beam must not eat later occurrences of the same
        // character pair: A_1_1 reduces to A_1, not A.
        let flat = flat(&[("A_1_1", 2.0)]);
        let grouped = split_by_beam(&flat).unwrap();
        assert_eq!(
            grouped.get("1").unwrap().get("A_1"),
            Some(&BeamValue::Single(scalar(2.0)))
        );
    }

    #[test]
    fn higher_suffixes_are_not_ranges() {
        let flat = flat(&[("DYDX_A_0", 0.0), ("DYDX_A_1", 1.0), ("DYDX_A_2", 2.0)]);
        let grouped = split_by_beam(&flat).unwrap();
        let a = grouped.get("A").unwrap();
        assert_eq!(
            a.get("DYDX"),
            Some(&BeamValue::Range(scalar(0.0), scalar(1.0)))
        );
        assert_eq!(a.get("DYDX_2"), Some(&BeamValue::Single(scalar(2.0))));
    }

    #[test]
    fn list_valued_range_pairs_collapse_too() {
        let mut flat = FlatConfig::new();
        flat.insert(
            "DLDP_A_0".to_string(),
            ConfValue::List(vec![Number::Float(0.75), Number::Float(0.1)]),
        );
        flat.insert(
            "DLDP_A_1".to_string(),
            ConfValue::List(vec![Number::Float(2.25), Number::Float(0.2)]),
        );
        let grouped = split_by_beam(&flat).unwrap();
        let range = grouped.get("A").unwrap().get("DLDP").unwrap();
        let (lo, hi) = range.as_range().unwrap();
        assert_eq!(
            lo,
            &ConfValue::List(vec![Number::Float(0.75), Number::Float(0.1)])
        );
        assert_eq!(
            hi,
            &ConfValue::List(vec![Number::Float(2.25), Number::Float(0.2)])
        );
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let grouped = split_by_beam(&FlatConfig::new()).unwrap();
        assert!(grouped.is_empty());
        assert!(grouped.groups.is_empty());
    }
}
