//! Restaurant discovery engine for the tablemate map and list views.
//!
//! - [`ClusterEngine`]: zoom-adaptive two-phase marker clustering
//! - [`Paginator`]: the list page window and the capped map-marker window
//! - [`AnimationGuard`]: single-flight guard for merge animations
//! - [`DiscoveryController`]: ties search, filtering, paging and clustering
//!   together behind the interface the UI layer consumes
//!
//! # Example
//!
//! ```
//! use tablemate_core::{config::ConfigSchema, Restaurant};
//! use tablemate_discovery::DiscoveryController;
//!
//! let mut controller = DiscoveryController::new(ConfigSchema::default()).unwrap();
//! controller.load(vec![
//!     Restaurant::new("1", "교촌치킨 강남점").at(37.4979, 127.0276),
//!     Restaurant::new("2", "맥도날드 역삼점").at(37.5006, 127.0364),
//! ]);
//!
//! controller.set_query("치킨");
//! assert_eq!(controller.visible().len(), 1);
//! assert_eq!(controller.clusters().count(), 1);
//! ```

pub mod animation;
pub mod cluster;
pub mod controller;
pub mod error;
pub mod filter;
pub mod paginator;
pub mod source;

pub use animation::AnimationGuard;
pub use cluster::{diff_clusters, Cluster, ClusterEngine, ClusterTransition, TransitionKind};
pub use controller::{DiscoveryController, RegionOutcome, DEFAULT_ZOOM_LEVEL};
pub use error::{DiscoveryError, Result};
pub use filter::{DiscoveryFilter, SortOrder};
pub use paginator::Paginator;
pub use source::{DataOrigin, JsonFileSource, OfflineSnapshot, RestaurantSource, SNAPSHOT_KEY};
