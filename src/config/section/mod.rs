//! Configuration section definitions.
//!
//! Each module corresponds to a section in `structure.toml`:
//!
//! | Module   | TOML Section | Purpose                            |
//! |----------|--------------|------------------------------------|
//! | `locale` | `[locale]`   | Active locales and the default     |
//! | `slug`   | `[slug]`     | Slug separator and case            |
//! | `router` | `[router]`   | Base URL, regex matching options   |
//! | `store`  | `[store]`    | Snapshot file location             |
//! | `layout` | `[layout]`   | Defaults for auto-created pages    |

mod layout;
mod locale;
mod router;
mod slug;
mod store;

pub use layout::LayoutConfig;
pub use locale::LocaleConfig;
pub use router::RouterConfig;
pub use slug::{SlugCase, SlugConfig, SlugSeparator};
pub use store::StoreConfig;
