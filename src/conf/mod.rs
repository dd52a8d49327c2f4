//! Trace-configuration layer: core types, line parsing, beam grouping.
//!
//! Architecture:
//! ```text
//!  NIRISS_*.conf text
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  parser   │  key/value lines → FlatConfig
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ FlatConfig  │  key → scalar | list
//!   └────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  beams    │  split per dispersion order, collapse _0/_1 ranges
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────────┐
//!   │ GroupedConfig  │  beam → stripped key → value
//!   └───────────────┘
//! ```

pub mod beams;
pub mod model;
pub mod parser;
