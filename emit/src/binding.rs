//! 绑定（Binding）
//!
//! 一个逻辑通道上的有序监听集合：
//! - `add`：追加监听记录，插入顺序即触发顺序；
//! - `remove`：按句柄身份移除，移除不存在的记录为空操作；
//! - `emit`：同步依次触发全部监听，`active == false` 时为空操作。
//!
//! 触发采用“快照后触发”：
//! - 本轮触发期间新增的监听，要到下一次 `emit` 才会被调用；
//! - 本轮触发期间被移除且尚未轮到的监听，本轮不再调用。
//!
//! 监听列表由 `Mutex` 保护，且回调执行期间从不持锁，
//! 因此回调中可以安全地对同一 Binding 调用 `add` / `remove` / `emit`。
//! 回调中的 panic 会中止本轮剩余监听并传播给调用方。
//!
use crate::listener::{Listener, ListenerHandle, RemoveFn};
use crate::options::ListenerOptions;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub struct Binding<A, S = (), R = ()> {
    inner: Arc<Inner<A, S, R>>,
}

struct Inner<A, S, R> {
    listeners: Mutex<Vec<ListenerHandle<A, S, R>>>,
    active: AtomicBool,
}

impl<A, S, R> Inner<A, S, R> {
    fn listeners(&self) -> MutexGuard<'_, Vec<ListenerHandle<A, S, R>>> {
        // 持锁期间不执行回调，中毒只可能来自列表操作本身，数据仍可用
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, listener: &Listener<A, S, R>) -> bool {
        let removed = {
            let mut listeners = self.listeners();
            let before = listeners.len();
            listeners.retain(|l| !std::ptr::eq(Arc::as_ptr(l), listener));
            listeners.len() != before
        };
        if removed {
            listener.detach();
            tracing::trace!(event_type = ?listener.event_type(), "listener removed");
        }
        removed
    }
}

impl<A, S, R> Binding<A, S, R>
where
    A: 'static,
    S: Send + Sync + 'static,
    R: 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                listeners: Mutex::new(Vec::new()),
                active: AtomicBool::new(true),
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// 停用期间 `emit` 不触发任何监听；注册与移除不受影响
    pub fn set_active(&self, active: bool) {
        self.inner.active.store(active, Ordering::Release);
    }

    /// 当前监听数量
    pub fn len(&self) -> usize {
        self.inner.listeners().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.listeners().is_empty()
    }

    /// 以默认选项注册监听
    pub fn on(
        &self,
        callback: impl Fn(Option<&S>, &A) -> R + Send + Sync + 'static,
    ) -> ListenerHandle<A, S, R> {
        self.add(callback, ListenerOptions::default())
    }

    /// 注册监听，返回可用于 [`Binding::remove`] 的句柄
    pub fn add(
        &self,
        callback: impl Fn(Option<&S>, &A) -> R + Send + Sync + 'static,
        options: ListenerOptions<S>,
    ) -> ListenerHandle<A, S, R> {
        self.add_observed(callback, options, None)
    }

    /// 注册监听；记录自行移除（once 触发后）时额外调用 `on_removed`
    pub(crate) fn add_observed(
        &self,
        callback: impl Fn(Option<&S>, &A) -> R + Send + Sync + 'static,
        options: ListenerOptions<S>,
        on_removed: Option<Arc<RemoveFn<A, S, R>>>,
    ) -> ListenerHandle<A, S, R> {
        let ListenerOptions {
            once,
            scope,
            event_type,
        } = options;

        let listener = Arc::new(Listener::new(
            event_type,
            callback,
            scope,
            once,
            Some(self.remove_callback(on_removed)),
        ));
        self.inner.listeners().push(listener.clone());

        tracing::trace!(event_type = ?listener.event_type(), once, "listener added");
        listener
    }

    /// 位置参数形式的 [`Binding::add`]
    pub fn add_with(
        &self,
        callback: impl Fn(Option<&S>, &A) -> R + Send + Sync + 'static,
        once: bool,
        scope: Option<S>,
        event_type: Option<String>,
    ) -> ListenerHandle<A, S, R> {
        self.add(
            callback,
            ListenerOptions {
                once,
                scope,
                event_type,
            },
        )
    }

    /// 移除与 `listener` 为同一对象的全部记录；不在本 Binding 中时为空操作
    pub fn remove(&self, listener: &Listener<A, S, R>) {
        self.inner.remove(listener);
    }

    /// 移除全部监听
    pub fn clear(&self) {
        let drained = std::mem::take(&mut *self.inner.listeners());
        for listener in &drained {
            listener.detach();
        }
    }

    /// 依次触发全部监听
    pub fn emit(&self, args: &A) {
        if !self.is_active() {
            return;
        }
        for listener in self.snapshot() {
            if listener.is_attached() {
                listener.fire(args);
            }
        }
    }

    fn snapshot(&self) -> Vec<ListenerHandle<A, S, R>> {
        self.inner.listeners().clone()
    }

    /// 绑定到本 Binding 移除操作的回调，仅持有弱引用
    fn remove_callback(
        &self,
        on_removed: Option<Arc<RemoveFn<A, S, R>>>,
    ) -> Arc<RemoveFn<A, S, R>> {
        let inner: Weak<Inner<A, S, R>> = Arc::downgrade(&self.inner);
        Arc::new(move |listener: &Listener<A, S, R>| {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            if inner.remove(listener) {
                if let Some(on_removed) = &on_removed {
                    on_removed(listener);
                }
            }
        })
    }
}

impl<A, S, T, E> Binding<A, S, Result<T, E>>
where
    A: 'static,
    S: Send + Sync + 'static,
    T: 'static,
    E: 'static,
{
    /// 依次触发全部监听，遇到第一个 `Err` 立即停止并返回该错误
    pub fn try_emit(&self, args: &A) -> Result<(), E> {
        if !self.is_active() {
            return Ok(());
        }
        for listener in self.snapshot() {
            if !listener.is_attached() {
                continue;
            }
            if let Some(Err(err)) = listener.fire(args) {
                return Err(err);
            }
        }
        Ok(())
    }
}

impl<A, S, R> Clone for Binding<A, S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A, S, R> Default for Binding<A, S, R>
where
    A: 'static,
    S: Send + Sync + 'static,
    R: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
