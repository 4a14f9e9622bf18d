//! 监听记录（Listener）
//!
//! 一条订阅：回调 + 触发策略（once / scope / active）。
//! 通常由 [`Binding::add`](crate::binding::Binding::add) 创建并作为移除句柄返回，
//! 也可独立构造用于直接 `fire`。
//!
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 监听回调：接收生效的 scope（若有）与参数
pub type ListenerFn<A, S, R> = dyn Fn(Option<&S>, &A) -> R + Send + Sync;

/// 移除回调：`once` 记录触发后以自身为参数调用，请求所属 Binding 将其移除
pub type RemoveFn<A, S, R> = dyn Fn(&Listener<A, S, R>) + Send + Sync;

/// 由 `add` 返回的句柄，按指针身份（而非值）识别
pub type ListenerHandle<A, S = (), R = ()> = Arc<Listener<A, S, R>>;

pub struct Listener<A, S = (), R = ()> {
    event_type: Option<String>,
    callback: Arc<ListenerFn<A, S, R>>,
    scope: Option<S>,
    once: bool,
    active: AtomicBool,
    // once 记录的触发占位，保证至多触发一次
    claimed: AtomicBool,
    // 仍在所属 Binding 的监听列表中
    attached: AtomicBool,
    remove_callback: Option<Arc<RemoveFn<A, S, R>>>,
}

impl<A, S, R> Listener<A, S, R> {
    pub fn new(
        event_type: Option<String>,
        callback: impl Fn(Option<&S>, &A) -> R + Send + Sync + 'static,
        scope: Option<S>,
        once: bool,
        remove_callback: Option<Arc<RemoveFn<A, S, R>>>,
    ) -> Self {
        Self {
            event_type,
            callback: Arc::new(callback),
            scope,
            once,
            active: AtomicBool::new(true),
            claimed: AtomicBool::new(false),
            attached: AtomicBool::new(true),
            remove_callback,
        }
    }

    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    pub fn callback(&self) -> &Arc<ListenerFn<A, S, R>> {
        &self.callback
    }

    pub fn scope(&self) -> Option<&S> {
        self.scope.as_ref()
    }

    pub fn is_once(&self) -> bool {
        self.once
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// 停用后 `fire` 不再调用回调，但记录仍保留在 Binding 中
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    pub fn has_remove_callback(&self) -> bool {
        self.remove_callback.is_some()
    }

    /// 以记录自身的 scope 触发回调
    ///
    /// 停用时返回 `None` 且无副作用；否则返回回调的返回值。
    /// 回调中的 panic 原样向调用方传播。
    pub fn fire(&self, args: &A) -> Option<R> {
        self.fire_with(None, args)
    }

    /// 触发回调；记录未设置 scope 时回退到调用方提供的 `default_scope`
    pub fn fire_with(&self, default_scope: Option<&S>, args: &A) -> Option<R> {
        if !self.is_active() {
            return None;
        }

        let claim = if self.once {
            if self.claimed.swap(true, Ordering::AcqRel) {
                return None;
            }
            Some(Claim(&self.claimed))
        } else {
            None
        };

        let ret = (self.callback)(self.scope.as_ref().or(default_scope), args);

        if let Some(claim) = claim {
            claim.commit();
            if let Some(remove) = &self.remove_callback {
                remove(self);
            }
        }
        Some(ret)
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    pub(crate) fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }
}

impl<A, S: fmt::Debug, R> fmt::Debug for Listener<A, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("event_type", &self.event_type)
            .field("scope", &self.scope)
            .field("once", &self.once)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// 回调 panic 时释放 once 占位，使记录保持可触发（未成功触发不视为已消费）
struct Claim<'a>(&'a AtomicBool);

impl Claim<'_> {
    fn commit(self) {
        std::mem::forget(self);
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
