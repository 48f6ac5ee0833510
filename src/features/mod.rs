//! The four fixed-length feature extractors (C1). Each is a pure function
//! of (session, history) producing a vector whose length and semantics are
//! fixed and must match the normalizer/model trained with it (spec.md §4.1).

pub mod geo;
pub mod network;
pub mod temporal;
pub mod useragent;
