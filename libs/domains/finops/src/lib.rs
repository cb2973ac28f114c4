//! FinOps Domain
//!
//! Domain types and persistence for the cloud cost-optimization engine:
//! workspaces, job runs, the resource inventory, and the recommendations
//! produced against it. The collection/analysis pipeline itself (cloud
//! clients, collectors, scheduler) lives in the `finops-engine` binary
//! crate — this crate holds the parts that are pure and reusable: the
//! data model, the pricing & cost model, and the analyzer library.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │     Service       │  ← workspace/job-run/recommendation operations
//! └─────────┬─────────┘
//!           │
//! ┌─────────▼─────────┐
//! │    Repository      │  ← data access (trait + Postgres implementation)
//! └─────────┬─────────┘
//!           │
//! ┌─────────▼─────────┐
//! │  Entity / Models    │  ← sea-orm models, domain structs and enums
//! └────────────────────┘
//!
//! Cost model (cost.rs) and analyzers (analyzers.rs) are pure functions
//! over descriptors.rs shapes; they don't depend on the repository layer.
//! ```

pub mod analyzers;
pub mod cost;
pub mod descriptors;
pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{FinopsError, FinopsResult};
pub use models::{
    Confidence, CreateWorkspace, JobRun, JobRunStatus, Recommendation, RecommendationStatus,
    RecommendationType, RecommendationUpsert, Resource, ResourceRecord, Workspace,
    WorkspaceStatus,
};
pub use postgres::PgFinopsRepository;
pub use repository::FinopsRepository;
pub use service::FinopsService;
