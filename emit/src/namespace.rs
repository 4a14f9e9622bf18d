//! 进程级命名空间槽位
//!
//! 可选的全局集成点：把一个共享值（通常是应用级 `Emitter`）放入进程唯一的槽位，
//! 同时记住原占用者；`no_conflict` 归还原占用者并交回已安装的值。
//!
//! ```
//! use std::sync::Arc;
//! use emit::{Emitter, namespace};
//!
//! let installed = namespace::install(Arc::new(Emitter::<String>::new()));
//! let emitter = namespace::current::<Emitter<String>>().expect("installed");
//! emitter.on("greet", |_, name| println!("hello, {name}"));
//!
//! let mine = installed.no_conflict();
//! assert!(namespace::current::<Emitter<String>>().is_none());
//! assert_eq!(mine.listener_count("greet"), 1);
//! ```
//!
use std::any::Any;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

type Occupant = Arc<dyn Any + Send + Sync>;

static SLOT: LazyLock<RwLock<Option<Occupant>>> = LazyLock::new(|| RwLock::new(None));

/// 安装 `value`，返回可用于恢复原占用者的凭据
pub fn install<T>(value: Arc<T>) -> Installed<T>
where
    T: Any + Send + Sync,
{
    let occupant: Occupant = value.clone();
    let previous = SLOT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(occupant);

    tracing::debug!(replaced = previous.is_some(), "namespace installed");
    Installed { value, previous }
}

/// 读取当前占用者；槽位为空或类型不符时返回 `None`
pub fn current<T>() -> Option<Arc<T>>
where
    T: Any + Send + Sync,
{
    let occupant = SLOT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()?;
    occupant.downcast::<T>().ok()
}

pub fn is_occupied() -> bool {
    SLOT.read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

#[must_use = "dropping `Installed` leaves the value in place without a way to restore the prior occupant"]
pub struct Installed<T> {
    value: Arc<T>,
    previous: Option<Occupant>,
}

impl<T> Installed<T> {
    pub fn value(&self) -> &Arc<T> {
        &self.value
    }

    /// 恢复安装前的占用者，并交回本次安装的值
    pub fn no_conflict(self) -> Arc<T> {
        *SLOT.write().unwrap_or_else(PoisonError::into_inner) = self.previous;
        tracing::debug!("namespace restored");
        self.value
    }
}
