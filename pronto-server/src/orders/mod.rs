//! 订单模块
//!
//! - [`state_machine`] - 状态迁移表与守卫条件
//! - [`OrderService`] - 订单 / 会话 / 改单 / 分单业务入口
//! - [`money`] - rust_decimal 金额计算
//! - [`notify`] - 通知触发

pub mod error;
pub mod modification;
pub mod money;
pub mod notify;
pub mod service;
pub mod sessions;
pub mod split_bill;
pub mod state_machine;

#[cfg(test)]
mod tests;

pub use error::{OrderError, OrderResult};
pub use modification::ModificationOutcome;
pub use money::TaxPolicy;
pub use notify::{BroadcastNotifier, Notification, NotificationEvent, Notifier};
pub use service::{MenuCatalog, OrderService};
pub use state_machine::{Actor, TransitionPayload, WorkflowPolicy};
