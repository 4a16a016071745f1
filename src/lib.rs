//! Persistence layer for a desktop media player: a SQLite catalog of media
//! files kept in sync with a flat local media folder, plus named playlists
//! over that catalog.
//!
//! The moving parts are the [`reconciler::Reconciler`] (set-difference
//! convergence of folder vs. catalog), the [`db::Catalog`] store, and the
//! [`playlists::PlaylistManager`]. The graphical shell and the playback
//! engine are external collaborators; the latter plugs in through
//! [`probe::DurationProbe`].

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod playlists;
pub mod probe;
pub mod reconciler;
pub mod scanner;
pub mod watcher;

pub use config::LibraryConfig;
pub use db::Catalog;
pub use error::{LibraryError, Result};
pub use logging::Logger;
pub use models::{format_seconds, Media, Playlist};
pub use playlists::PlaylistManager;
pub use probe::{DurationProbe, NoProbe};
pub use reconciler::Reconciler;
