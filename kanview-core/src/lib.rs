//! Kanban model core for host-embedded analytics visualizations.
//!
//! The embedding host supplies columnar data, column metadata, a role
//! configuration, and a settings JSON blob; this crate turns those into a
//! renderable board/card model ([`builder::build`]), keeps an optimistic
//! overlay over it while card moves round-trip through the host
//! ([`reconcile::Reconciler`]), and pushes category/date changes back
//! through the [`host::HostWriteback`] sink. Rendering itself lives in the
//! embedding application; the core only returns data.
//!
//! [`controller::BoardController`] is the usual entry point: feed it host
//! callbacks, render what `display()` returns.

pub mod builder;
pub mod columns;
pub mod config;
pub mod controller;
pub mod dates;
pub mod host;
pub mod reconcile;
pub mod settings;
pub mod sort;
pub mod types;

pub use builder::{build, BuildError};
pub use columns::{ColumnInfo, ColumnMap, ColumnType};
pub use config::ElementConfig;
pub use controller::{BoardController, ControllerError, DateRole};
pub use host::{HostError, HostWriteback};
pub use reconcile::{Reconciler, CONFIRM_TIMEOUT};
pub use settings::{CardSorting, Settings, SortDirection, ViewMode, SORT_BY_TITLE};
pub use sort::sort_cards;
pub use types::{Board, Card, CardField, CellValue, ElementData, KanbanModel, KanbanStats};
