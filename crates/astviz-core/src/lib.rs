//! astviz Core Types and Definitions
//!
//! This crate provides the foundational pieces shared by the astviz
//! pipeline. It includes:
//!
//! - **Graph**: The rendering-ready tree of labeled nodes ([`graph::AstGraph`])
//! - **Labels**: Display-safety rules applied to every node label ([`label`] module)
//! - **Allocation accounting**: A tracking global allocator and per-call
//!   measurement used to bound memory growth ([`alloc`] module)

pub mod alloc;
pub mod graph;
pub mod label;
