//! Meihua Core - Plum-Blossom Numerology Engine
//!
//! Turns a calendar moment or two numbers into three related hexagrams and
//! reads a fortune from their elements:
//! - Static trigram and King Wen hexagram tables
//! - Time and number casting
//! - Mutual and transformed hexagram derivation
//! - Five-element relationship scoring
//! - Interpretation lookup and keyword search
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           DivinationEngine              │
//! │  (question + seed → DivinationResult)   │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┼─────────────────┐
//!      ▼           ▼                 ▼
//! ┌──────────┐ ┌───────────────┐ ┌──────────────┐
//! │derivation│ │ElementAnalyzer│ │Interpretation│
//! │(Bagua)   │ │               │ │Database      │
//! └──────────┘ └───────────────┘ └──────────────┘
//!      │
//!      ▼
//! ┌──────────────────┐
//! │trigram / hexagram│
//! │ static tables    │
//! └──────────────────┘
//! ```
//!
//! The engine is synchronous. Persistence sits behind the async
//! [`store::DivinationStore`] trait.

pub mod config;
pub mod derivation;
pub mod elements;
pub mod engine;
pub mod hexagram;
pub mod interpretation;
pub mod store;
pub mod trigram;
pub mod types;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use derivation::{
    Cast, Clock, DivinationParams, FixedClock, HexagramSet, MethodKind, NumberSeed, SeedMethod,
    SystemClock, TimeSeed,
};
pub use elements::{ElementAnalysis, ElementAnalyzer, Relationship, RelationshipKind};
pub use engine::{BasicInterpretation, DivinationEngine, DivinationResult};
pub use hexagram::{Bagua, Hexagram};
pub use interpretation::{HexagramEntry, InterpretationDatabase, PlaceholderFortune, SearchHit};
pub use store::{DivinationStore, InMemoryStore, StoreError, StoredDivination};
pub use trigram::Trigram;
pub use types::*;
