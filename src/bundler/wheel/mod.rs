//! Binary package handling: pinned dependencies, lookup, and extraction.

mod extract;
mod finder;
mod lockfile;

pub use extract::{DATA_SUFFIX, extract_wheel};
pub use finder::{PackageSource, PypiSource, TargetPython, WheelLookup, WheelName, canonical_name};
pub use lockfile::{DependencySpec, parse_lockfile, read_lockfile};
