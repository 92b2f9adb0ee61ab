//! Command-line interface module.

mod args;
pub mod lookup;
pub mod repair;
pub mod sitemap;
pub mod tree;

pub use args::{Cli, Commands};

use sitetree::core::Parameters;
use sitetree::core::params::from_pairs;

/// Repeated `key=value` flags as a parameter map, in flag order.
pub fn pairs_to_params(pairs: &[(String, String)]) -> Parameters {
    from_pairs(pairs.iter().cloned())
}
