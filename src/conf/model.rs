use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Number – a single numeric literal from a configuration file
// ---------------------------------------------------------------------------

/// A parsed numeric literal. Tokens without a decimal point or exponent
/// stay integers; everything else becomes a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Interpret the value as an `f64` regardless of variant.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(v) => *v,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfValue – the value side of one flat configuration entry
// ---------------------------------------------------------------------------

/// The value attached to a configuration key by the line parser: either a
/// single number or an ordered sequence of numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfValue {
    Scalar(Number),
    List(Vec<Number>),
}

impl ConfValue {
    /// The scalar payload, if this is a single number.
    pub fn as_scalar(&self) -> Option<Number> {
        match self {
            ConfValue::Scalar(n) => Some(*n),
            ConfValue::List(_) => None,
        }
    }
}

impl fmt::Display for ConfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfValue::Scalar(n) => write!(f, "{n}"),
            ConfValue::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// BeamValue – a grouped entry, possibly a collapsed range pair
// ---------------------------------------------------------------------------

/// One entry of a beam's sub-mapping after grouping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BeamValue {
    /// A value carried over unchanged from the flat configuration.
    Single(ConfValue),
    /// A collapsed `<name>_0` / `<name>_1` pair: (lower, upper).
    Range(ConfValue, ConfValue),
}

impl BeamValue {
    /// The `(lower, upper)` pair, if this entry is a collapsed range.
    pub fn as_range(&self) -> Option<(&ConfValue, &ConfValue)> {
        match self {
            BeamValue::Range(lo, hi) => Some((lo, hi)),
            BeamValue::Single(_) => None,
        }
    }
}

impl fmt::Display for BeamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeamValue::Single(v) => write!(f, "{v}"),
            BeamValue::Range(lo, hi) => write!(f, "({lo}, {hi})"),
        }
    }
}

// ---------------------------------------------------------------------------
// FlatConfig / GroupedConfig – the two parsing stages
// ---------------------------------------------------------------------------

/// Flat key → value mapping produced by the line parser.
/// Invariant: no key contains `FILTER` or `SENS`.
pub type FlatConfig = BTreeMap<String, ConfValue>;

/// The entries of a single beam after the beam token has been stripped
/// from the key names.
pub type BeamMap = BTreeMap<String, BeamValue>;

/// Per-beam view of a [`FlatConfig`], one sub-mapping per dispersion
/// order. Keys that never matched the beam pattern are not carried over.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedConfig {
    /// Beam tokens (uppercased) in the order they were discovered.
    pub beams: Vec<String>,
    /// Beam token → stripped key → value.
    pub groups: BTreeMap<String, BeamMap>,
}

impl GroupedConfig {
    /// Entries for one beam, if it was discovered.
    pub fn get(&self, beam: &str) -> Option<&BeamMap> {
        self.groups.get(beam)
    }

    /// Number of discovered beams.
    pub fn len(&self) -> usize {
        self.beams.len()
    }

    /// Whether no beam pattern matched at all.
    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }
}
