//! # Patch Radar
//!
//! A duplicate-patch recommender for code-review histories.
//!
//! Given a reference patch, Patch Radar scores every patch submitted within a
//! configurable time window against it — combining text-embedding similarity,
//! file-path structure statistics, and temporal distance into a feature vector
//! scored by a pre-trained per-project classifier — and returns the top-K most
//! likely duplicates over HTTP or the CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌────────────┐
//! │  Corpus  │──▶│ Candidates │──▶│ Features │──▶│ Classifier │
//! │ (JSON)   │   │ ±N days    │   │ sim+path │   │ top-K rank │
//! └──────────┘   └────────────┘   └────┬─────┘   └─────┬──────┘
//!      ▲                               │               │
//! ┌────┴─────┐                   ┌─────▼────┐    ┌─────▼────┐
//! │  Gerrit  │                   │ Embedder │    │ CLI/HTTP │
//! │ fallback │                   │ batch    │    │ (pradar) │
//! └──────────┘                   └──────────┘    └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pradar --config ./config/radar.toml projects
//! pradar --config ./config/radar.toml predict openstack 812345
//! pradar --config ./config/radar.toml serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`corpus`] | Per-project patch corpus loaded from disk |
//! | [`candidates`] | Time-window candidate selection |
//! | [`path_sim`] | Pairwise file-path similarity statistics |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`features`] | Pairwise feature vectors |
//! | [`classifier`] | Pre-trained classifier and batch scoring |
//! | [`predict`] | Ranking pipeline (candidates → features → top-K) |
//! | [`remote`] | Gerrit fallback lookup for unknown patches |
//! | [`registry`] | Read-only per-project corpus/model registry |
//! | [`server`] | Prediction HTTP server |

pub mod candidates;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod features;
pub mod models;
pub mod path_sim;
pub mod predict;
pub mod registry;
pub mod remote;
pub mod server;
