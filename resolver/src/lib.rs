//! Resolution of command lines into browser and pager actions.
//!
//! [`Resolver`] decides between direct URLs, alias expansion and search
//! fallback, producing a [`Resolution`]. [`Dispatcher`] then runs the
//! resulting actions through a [`Launcher`], normally the process-spawning
//! [`SystemLauncher`].
//!
//! # Example
//!
//! ```no_run
//! use webalias_db::Settings;
//! use webalias_resolver::{Dispatcher, Request, Resolution, Resolver, SystemLauncher};
//!
//! let path = Settings::default_path().unwrap();
//! let settings = Settings::load_or_default(&path).unwrap();
//! let store = settings.store_builder(&path).build().unwrap();
//! let launcher = SystemLauncher::from_settings(&settings);
//!
//! let resolver = Resolver::new(&store, &settings, &launcher).unwrap();
//! match resolver.resolve(&Request::new(["gh", "golang/go"])).unwrap() {
//!     Resolution::Dispatch { actions, .. } => {
//!         Dispatcher::new(&settings).dispatch(&actions, &launcher).unwrap()
//!     }
//!     Resolution::Clipboard { urls, .. } => {
//!         Dispatcher::new(&settings).copy(&urls, &launcher).unwrap()
//!     }
//!     Resolution::NotFound { name } => eprintln!("alias not found: {name}"),
//! }
//! ```

mod detect;
mod dispatch;
mod error;
mod resolver;

pub use detect::UrlDetector;
pub use dispatch::{Dispatcher, Launch, Launcher, SystemLauncher};
pub use error::{Error, Result};
pub use resolver::{Mode, Request, Resolution, Resolver};
