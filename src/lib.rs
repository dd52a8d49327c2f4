//! Parsing support for aXe-style grism trace configuration files.
//!
//! Trace configuration files are hand-authored text files describing the
//! spectral traces of a slitless spectrograph, one `KEY value [value...]`
//! pair per line. Keys carry a one-character *beam* token naming the
//! dispersion order they belong to (`DISPX_A_0`, `DYDX_B_1`, ...).
//!
//! The crate parses such files into a flat mapping ([`FlatConfig`]),
//! regroups the entries per beam with `_0`/`_1` range pairs collapsed
//! ([`GroupedConfig`]), and provides the two collaborators the downstream
//! reference-file assembly needs: a sensitivity table reader and the
//! common reference-file keyword builder.
//!
//! ```
//! use grism_conf::{parse_str, split_by_beam};
//!
//! let flat = parse_str("FWCPOS_REF 353.56\nDISPX_A_0 0.1\nDISPX_A_1 0.2\n")?;
//! let grouped = split_by_beam(&flat)?;
//! assert_eq!(grouped.beams, vec!["A"]);
//! # Ok::<(), grism_conf::ConfigError>(())
//! ```

pub mod conf;
pub mod error;
pub mod keywords;
pub mod sensitivity;

pub use conf::beams::split_by_beam;
pub use conf::model::{BeamMap, BeamValue, ConfValue, FlatConfig, GroupedConfig, Number};
pub use conf::parser::{parse_file, parse_str};
pub use error::ConfigError;
pub use keywords::{KeywordOptions, reference_file_keywords};
pub use sensitivity::{SensitivityTable, read_sensitivity_file};
