//! Core types - pure abstractions shared across the codebase.

mod locale;
pub mod params;
mod url;

pub use locale::{ConfiguredLocales, Locale, LocaleProvider};
pub use params::Parameters;
pub use url::RequestPath;
