//! 事件发射器（Emitter）
//!
//! 以事件类型字符串为键路由到各自的 [`Binding`]：
//! - 首次 `add` 某类型时惰性创建 Binding；
//! - 某类型的监听数归零后删除该键（包括 once 监听自动移除的情形，无论经由
//!   `emit` 还是直接对句柄调用 `fire`）；
//! - 向未注册的类型 `emit`、移除外来或已移除的句柄均为空操作。
//!
//! 各实例相互独立，不存在全局注册表。
//!
use crate::binding::Binding;
use crate::error::{EmitError, EmitResult};
use crate::listener::{Listener, ListenerHandle, RemoveFn};
use crate::options::ListenerOptions;
use dashmap::DashMap;
use std::sync::{Arc, Weak};

type Bindings<A, S, R> = DashMap<String, Binding<A, S, R>>;

pub struct Emitter<A, S = (), R = ()> {
    bindings: Arc<Bindings<A, S, R>>,
}

impl<A, S, R> Emitter<A, S, R>
where
    A: 'static,
    S: Send + Sync + 'static,
    R: 'static,
{
    pub fn new() -> Self {
        Self {
            bindings: Arc::new(DashMap::new()),
        }
    }

    /// 以默认选项注册 `event_type` 的监听
    pub fn on(
        &self,
        event_type: impl Into<String>,
        callback: impl Fn(Option<&S>, &A) -> R + Send + Sync + 'static,
    ) -> ListenerHandle<A, S, R> {
        self.add(event_type, callback, ListenerOptions::default())
    }

    /// 注册只触发一次的监听
    pub fn once(
        &self,
        event_type: impl Into<String>,
        callback: impl Fn(Option<&S>, &A) -> R + Send + Sync + 'static,
    ) -> ListenerHandle<A, S, R> {
        self.add(event_type, callback, ListenerOptions::once())
    }

    /// 注册监听，返回可用于 [`Emitter::remove`] 的句柄
    ///
    /// `options.event_type` 会被 `event_type` 覆盖。
    pub fn add(
        &self,
        event_type: impl Into<String>,
        callback: impl Fn(Option<&S>, &A) -> R + Send + Sync + 'static,
        options: ListenerOptions<S>,
    ) -> ListenerHandle<A, S, R> {
        let event_type = event_type.into();
        let options = ListenerOptions {
            event_type: Some(event_type.clone()),
            ..options
        };

        let on_removed = self.collector();
        // 在分片锁内完成追加，避免与空通道回收交错
        let binding = self.bindings.entry(event_type).or_default();
        binding.add_observed(callback, options, Some(on_removed))
    }

    /// 位置参数形式的 [`Emitter::add`]
    pub fn add_with(
        &self,
        event_type: impl Into<String>,
        callback: impl Fn(Option<&S>, &A) -> R + Send + Sync + 'static,
        once: bool,
        scope: Option<S>,
    ) -> ListenerHandle<A, S, R> {
        self.add(
            event_type,
            callback,
            ListenerOptions {
                once,
                scope,
                event_type: None,
            },
        )
    }

    /// 按记录上的事件类型路由到对应 Binding 移除；Binding 为空时删除该类型
    pub fn remove(&self, listener: &Listener<A, S, R>) {
        let Some(event_type) = listener.event_type() else {
            return;
        };
        let Some(binding) = self.binding(event_type) else {
            return;
        };

        binding.remove(listener);
        self.collect(event_type);
    }

    /// 触发 `event_type` 的全部监听；未注册的类型为空操作
    pub fn emit(&self, event_type: &str, args: &A) {
        let Some(binding) = self.binding(event_type) else {
            tracing::trace!(event_type, "emit without listeners");
            return;
        };

        binding.emit(args);
        self.collect(event_type);
    }

    pub fn has_listeners(&self, event_type: &str) -> bool {
        self.bindings.contains_key(event_type)
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.binding(event_type).map_or(0, |b| b.len())
    }

    /// 当前有监听的事件类型（只读视图，顺序不保证）
    pub fn event_types(&self) -> Vec<String> {
        self.bindings.iter().map(|e| e.key().clone()).collect()
    }

    /// 停用或恢复某一类型的触发；该类型尚无监听时为空操作
    pub fn set_active(&self, event_type: &str, active: bool) {
        if let Some(binding) = self.binding(event_type) {
            binding.set_active(active);
        }
    }

    /// 移除某一类型的全部监听
    pub fn clear(&self, event_type: &str) {
        if let Some((_, binding)) = self.bindings.remove(event_type) {
            binding.clear();
            tracing::debug!(event_type, "channel cleared");
        }
    }

    /// 移除全部监听
    pub fn clear_all(&self) {
        self.bindings.retain(|_, binding| {
            binding.clear();
            false
        });
    }

    fn binding(&self, event_type: &str) -> Option<Binding<A, S, R>> {
        // 克隆出 Binding 后立即释放分片锁，回调中可重入 add/remove/emit
        self.bindings.get(event_type).map(|b| b.clone())
    }

    fn collect(&self, event_type: &str) {
        collect(&self.bindings, event_type);
    }

    /// once 记录自行移除后回收其通道，仅持有弱引用
    fn collector(&self) -> Arc<RemoveFn<A, S, R>> {
        let bindings: Weak<Bindings<A, S, R>> = Arc::downgrade(&self.bindings);
        Arc::new(move |listener: &Listener<A, S, R>| {
            let Some(bindings) = bindings.upgrade() else {
                return;
            };
            if let Some(event_type) = listener.event_type() {
                collect(&bindings, event_type);
            }
        })
    }
}

fn collect<A, S, R>(bindings: &Bindings<A, S, R>, event_type: &str)
where
    A: 'static,
    S: Send + Sync + 'static,
    R: 'static,
{
    if bindings
        .remove_if(event_type, |_, binding| binding.is_empty())
        .is_some()
    {
        tracing::trace!(event_type, "empty channel collected");
    }
}

impl<A, S, T, E> Emitter<A, S, Result<T, E>>
where
    A: 'static,
    S: Send + Sync + 'static,
    T: 'static,
    E: 'static,
{
    /// 触发 `event_type` 的监听，遇到第一个失败即停止并携带事件类型返回
    pub fn try_emit(&self, event_type: &str, args: &A) -> EmitResult<E> {
        let Some(binding) = self.binding(event_type) else {
            tracing::trace!(event_type, "emit without listeners");
            return Ok(());
        };

        let result = binding.try_emit(args);
        self.collect(event_type);
        result.map_err(|source| EmitError::Listener {
            event_type: event_type.to_string(),
            source,
        })
    }
}

impl<A, S, R> Default for Emitter<A, S, R>
where
    A: 'static,
    S: Send + Sync + 'static,
    R: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn listener_type_is_set_by_emitter() {
        let e: Emitter<()> = Emitter::new();
        let l = e.add(
            "t",
            |_, _| {},
            ListenerOptions::builder().event_type("ignored").build(),
        );
        assert_eq!(l.event_type(), Some("t"));
    }

    #[test]
    fn binding_created_lazily_and_collected_on_last_remove() {
        let e: Emitter<()> = Emitter::new();
        assert!(!e.has_listeners("t"));

        let a = e.on("t", |_, _| {});
        let b = e.on("t", |_, _| {});
        assert_eq!(e.listener_count("t"), 2);
        assert_eq!(e.event_types(), vec!["t".to_string()]);

        e.remove(&a);
        assert!(e.has_listeners("t"));
        e.remove(&b);
        assert!(!e.has_listeners("t"));
        assert!(e.event_types().is_empty());

        // 已移除的句柄再次移除为空操作
        e.remove(&b);
        e.emit("t", &());
    }

    #[test]
    fn once_listener_collects_channel_after_emit() {
        let e: Emitter<()> = Emitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        e.once("t", move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        e.emit("t", &());
        e.emit("t", &());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!e.has_listeners("t"));
    }

    #[test]
    fn untyped_handle_is_ignored() {
        let e: Emitter<()> = Emitter::new();
        e.on("t", |_, _| {});
        let standalone: Binding<()> = Binding::new();
        let l = standalone.on(|_, _| {});

        e.remove(&l);
        assert_eq!(e.listener_count("t"), 1);
        assert_eq!(standalone.len(), 1);
    }

    #[test]
    fn clear_and_clear_all() {
        let e: Emitter<()> = Emitter::new();
        e.on("a", |_, _| {});
        e.on("b", |_, _| {});
        e.on("b", |_, _| {});

        e.clear("b");
        assert_eq!(e.listener_count("b"), 0);
        assert_eq!(e.listener_count("a"), 1);

        e.clear_all();
        assert!(e.event_types().is_empty());
    }

    #[test]
    fn set_active_gates_a_single_type() {
        let e: Emitter<()> = Emitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        for t in ["a", "b"] {
            let c = count.clone();
            e.on(t, move |_, _| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }

        e.set_active("a", false);
        e.emit("a", &());
        e.emit("b", &());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        e.set_active("a", true);
        e.emit("a", &());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn once_handle_fired_directly_collects_channel() {
        let e: Emitter<()> = Emitter::new();
        let h = e.once("t", |_, _| {});

        assert!(h.fire(&()).is_some());
        assert!(h.fire(&()).is_none());
        assert!(!e.has_listeners("t"));
        assert!(e.event_types().is_empty());
        assert_eq!(e.listener_count("t"), 0);

        // 回收后同一类型可重新注册
        e.on("t", |_, _| {});
        assert_eq!(e.listener_count("t"), 1);
    }

    #[test]
    fn once_handle_outliving_emitter_fires_without_collecting() {
        let e: Emitter<()> = Emitter::new();
        let h = e.once("t", |_, _| {});
        drop(e);

        assert!(h.fire(&()).is_some());
    }

    #[test]
    fn try_emit_collects_channel_after_once_listener() {
        let e: Emitter<(), (), Result<(), String>> = Emitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        e.once("t", move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(e.try_emit("t", &()).is_ok());
        assert!(!e.has_listeners("t"));
        assert!(e.event_types().is_empty());

        assert!(e.try_emit("t", &()).is_ok());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
