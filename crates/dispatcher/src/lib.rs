//! # Dispatcher
//!
//! 有界并发分发模块。
//!
//! 负责：
//! - 以固定上限并发执行 `RemoteCaller`
//! - 按输入位置收集每个查询的结果
//! - 隔离单个查询的失败，支持取消
//! - 将完成的运行结果写入 sink

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod sinks;

pub use contracts::{QueryBlob, ResultSink, RunSummary};
pub use dispatcher::BoundedDispatcher;
pub use error::DispatchError;
pub use metrics::{CountersSnapshot, RunCounters};
pub use sinks::{create_sink, ConfiguredSink, FileSink, LogSink};
pub use tokio_util::sync::CancellationToken;
