//! Bimsplit Core Types and Definitions
//!
//! This crate provides the foundational types shared by the bimsplit
//! discipline splitter. It includes:
//!
//! - **Identifiers**: Global/local element identifiers and interned
//!   entity-class tags ([`identifier`] module)
//! - **Categories**: Interned discipline labels ([`category::Category`])
//! - **Model**: The model element type and the session abstraction over a
//!   loaded building model ([`model`] module)
//! - **Scene**: The renderable node hierarchy, selection state, named
//!   collections and transient mesh modifiers ([`scene`] module)

pub mod category;
pub mod identifier;
pub mod model;
pub mod scene;
