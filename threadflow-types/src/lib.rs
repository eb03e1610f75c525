#![deny(missing_docs)]
//! Wire types shared across the threadflow workspace: messages, tool
//! calls, metadata, schema definitions, and request/response shapes for a
//! `ContentGenerator`.
//!
//! This crate has no async runtime dependency and no opinion about
//! concurrency — it is the leaves-first layer everything else builds on.

mod message;
mod metadata;
mod request;
mod response;
mod schema;

pub use message::{Message, Role, ToolCall, ToolFunction};
pub use metadata::{merge, reserved_keys, MergeStrategy, Metadata};
pub use request::{Request, RequestOptions, ToolChoice};
pub use response::{Response, ResponseKind};
pub use schema::{Definition, SchemaType};
