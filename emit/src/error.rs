//! 错误定义
//!
//! 库本身几乎不做校验：向未知类型 `emit`、移除外来句柄都不是错误。
//! 唯一的错误来源是监听回调返回的 `Err`，由 `try_emit` 附带事件类型向上传递。
//!
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EmitError<E> {
    #[error("listener failed: event_type={event_type}, reason={source}")]
    Listener {
        event_type: String,
        #[source]
        source: E,
    },
}

impl<E> EmitError<E> {
    pub fn event_type(&self) -> &str {
        match self {
            EmitError::Listener { event_type, .. } => event_type,
        }
    }

    /// 取出监听回调返回的原始错误
    pub fn into_source(self) -> E {
        match self {
            EmitError::Listener { source, .. } => source,
        }
    }
}

/// `Emitter::try_emit` 的结果类型别名
pub type EmitResult<E> = Result<(), EmitError<E>>;
