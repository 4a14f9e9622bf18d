//! 进程内同步事件库（emit）
//!
//! 由下至上三层组成：
//! - 监听记录（`listener`）：一个回调及其触发策略（once / scope / active）；
//! - 绑定（`binding`）：一个通道上的有序监听集合，可独立使用；
//! - 发射器（`emitter`）：按事件类型字符串路由到各自的绑定。
//!
//! 投递完全同步：`emit` 在调用方线程上依次执行全部监听后才返回，
//! 没有排队、异步或跨线程分发；监听之间不做错误隔离，panic 直接传播给调用方。
//! 所有类型均为 `Send + Sync`，内部以互斥保护监听列表与类型映射。
//!
//! 典型用法：
//! ```
//! use emit::{Emitter, ListenerOptions};
//!
//! let emitter: Emitter<(&str, u32), &str> = Emitter::new();
//! let handle = emitter.add(
//!     "order.paid",
//!     |scope, (id, cents)| println!("[{}] {id} paid {cents}", scope.unwrap_or(&"-")),
//!     ListenerOptions::builder().scope("billing").build(),
//! );
//!
//! emitter.emit("order.paid", &("o-1", 1200));
//! emitter.remove(&handle);
//! assert!(!emitter.has_listeners("order.paid"));
//! ```
//!
pub mod binding;
pub mod emitter;
pub mod error;
pub mod listener;
pub mod namespace;
pub mod options;

pub use binding::Binding;
pub use emitter::Emitter;
pub use error::{EmitError, EmitResult};
pub use listener::{Listener, ListenerFn, ListenerHandle, RemoveFn};
pub use options::ListenerOptions;
