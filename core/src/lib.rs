//! Client core for a task list kept in a hosted `todos` table.
//!
//! # Overview
//! - `TableClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network.
//! - `Transport` executes them; `ReqwestTransport` is the network-backed
//!   implementation.
//! - `RemoteStore` joins the two behind the four-operation `TaskStore` seam.
//! - `ListController` holds the list and input state a view renders, and
//!   resynchronizes with a full refetch after every successful mutation.
//!
//! # Design
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//! - Store errors are diagnostic only. The controller collapses them into
//!   "the operation failed" and decides per operation whether the user sees it.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod store;
pub mod transport;
pub mod types;

pub use client::TableClient;
pub use config::StoreConfig;
pub use controller::{Key, ListController, Notice};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::{RemoteStore, TaskStore};
pub use transport::{ReqwestTransport, Transport};
pub use types::{CompletionPatch, NewTask, Tally, Task, TaskId};
