//! 基础设施层（Infrastructure Layer）
//!
//! 持有稀缺资源（HTTP 会话），只暴露能力，不认识业务流程

pub mod portal_session;

pub use portal_session::PortalSession;
