//! # canteiro-engine
//!
//! Turns a loaded workbook into the data the dashboard shows.
//!
//! This crate provides:
//! - Project unification of oversight/execution sheet pairs (`unify`)
//! - S-curve trend generation with projection and deviation (`trend`)
//! - Cross-project aggregation and the reloadable state holder (`dashboard`)
//!
//! ## Example
//!
//! ```rust
//! use canteiro_core::budget::NoBudget;
//! use canteiro_core::config::Config;
//! use canteiro_engine::build_dashboard;
//! use canteiro_ingest::parse_json;
//!
//! let workbook = parse_json(r#"{
//!     "sheets": [
//!         { "name": "R200-1 - F", "rows": [
//!             { "Nome": "Obra X", "Nível": 1 },
//!             { "Nome": "Fundações", "Nível": 3, "% Concluído": 100 }
//!         ] }
//!     ]
//! }"#).unwrap();
//!
//! let data = build_dashboard(&workbook, &Config::default(), &NoBudget);
//! let project = data.project("R200-1").unwrap();
//! assert_eq!(project.name, "Obra X");
//! assert_eq!(project.metrics.progress_general, 100);
//! ```

pub mod dashboard;
pub mod trend;
pub mod unify;

pub use dashboard::{build_dashboard, Dashboard, DashboardData, DashboardState, DashboardSummary};
pub use trend::{generate, Trend, TrendPoint, TrendSeries};
pub use unify::unify;
