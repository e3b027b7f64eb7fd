//! Pipeline Client: one HTTP POST per statement, `[execute, close]`, bearer-authenticated.

pub mod client;
pub mod request;
pub mod response;

pub use client::PipelineClient;
pub use request::{PipelineRequest, Statement, StreamRequest};
pub use response::{ExecuteStep, PipelineResponse};
