//! Framework-agnostic business logic.
//!
//! The builder (`part`, `allocator`, `build`) is pure and synchronous. Catalog,
//! chat and mail modules sit behind traits so the HTTP layer and tests can swap
//! implementations. Account, forum and showcase modules operate on a `SeaORM`
//! connection.

/// Registration, verification, sessions and password resets
pub mod account;
/// Budget split across categories and per-category part selection
pub mod allocator;
/// Store search links for a component
pub mod availability;
/// A chosen set of parts and its affordability overlay
pub mod build;
/// Retailer catalog client and candidate loading
pub mod catalog;
/// AI assistant client
pub mod chat;
/// Built-in candidate parts
pub mod fallback;
/// Reactions and ratings shared by forum and showcase
pub mod feedback;
/// Forum tickets and messages
pub mod forum;
/// Outgoing email
pub mod mailer;
/// Categories, parts and budgets
pub mod part;
/// Spec summaries, price tiers and recommendation text
pub mod part_info;
/// Setup showcase
pub mod showcase;
