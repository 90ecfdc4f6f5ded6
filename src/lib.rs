//! World-geography quiz engine: dataset normalization, playable-set
//! construction, and a bounded-attempts guess/feedback state machine with
//! timed transitions.
//!
//! # Examples
//!
//! Synchronous core usage with [`quiz::state::QuizState`]:
//! ```
//! use geoquiz::{
//!     catalog::Catalog,
//!     playable::PlayableSet,
//!     quiz::state::{GuessOutcome, QuizState, SelectOutcome},
//!     types::QuizMode,
//!     world::{geometry::ConcatUnion, regions::RegionCollection, topology::WorldTopology},
//! };
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! let topo = WorldTopology::from_value(serde_json::json!({
//!     "type": "Topology",
//!     "objects": { "countries": { "type": "GeometryCollection", "geometries": [
//!         { "type": "Polygon", "id": "410", "arcs": [[0]],
//!           "properties": { "name": "South Korea" } },
//!         { "type": "Polygon", "id": "392", "arcs": [[1]],
//!           "properties": { "name": "Japan" } }
//!     ] } }
//! }));
//! let regions = RegionCollection::from_topology(&topo, &ConcatUnion);
//! let catalog = Catalog::bundled().expect("bundled catalog");
//! let playable = PlayableSet::build(&regions, &catalog);
//! assert_eq!(playable.len(), 2);
//!
//! let mut rng = SmallRng::seed_from_u64(7);
//! let mut quiz = QuizState::new(playable, QuizMode::FlagSelect, 3);
//! let SelectOutcome::Target { id, .. } = quiz.initialize(&mut rng) else {
//!     unreachable!("two entities are playable");
//! };
//! assert!(matches!(quiz.submit_guess(id), GuessOutcome::Correct { .. }));
//! ```
//!
//! Session runtime with the live dataset:
//! ```no_run
//! use geoquiz::{
//!     catalog::Catalog,
//!     fetch::WORLD_ATLAS_URL,
//!     runtime::handle::{spawn_session_loading, SessionConfig},
//!     types::QuizMode,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let catalog = Catalog::bundled().expect("bundled catalog");
//! let cfg = SessionConfig { mode: QuizMode::MapClick, ..SessionConfig::default() };
//! let handle = spawn_session_loading(catalog, WORLD_ATLAS_URL, cfg);
//! let snapshot = handle.snapshot().await.expect("snapshot");
//! println!("{} countries playable", snapshot.total);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Static country metadata and display-name resolution.
pub mod catalog;
/// Dataset fetch at the network boundary.
pub mod fetch;
/// Playable-set construction from regions and catalog.
pub mod playable;
/// Quiz state machine and viewport math.
pub mod quiz;
/// Single-writer session runtime and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
/// Geography dataset decode and normalization.
pub mod world;
