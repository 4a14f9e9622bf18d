use bon::Builder;

/// 注册监听时的可选项
///
/// ```
/// use emit::ListenerOptions;
///
/// let opts = ListenerOptions::builder().once(true).scope("ui").build();
/// assert!(opts.once);
/// assert_eq!(opts.scope, Some("ui"));
/// assert_eq!(opts.event_type, None);
/// ```
#[derive(Builder, Debug, Clone)]
pub struct ListenerOptions<S> {
    /// 触发一次后自动移除
    #[builder(default)]
    pub once: bool,
    /// 回调执行时的上下文
    pub scope: Option<S>,
    /// 事件类型；经 `Emitter` 注册时由其覆盖
    #[builder(into)]
    pub event_type: Option<String>,
}

impl<S> Default for ListenerOptions<S> {
    fn default() -> Self {
        Self {
            once: false,
            scope: None,
            event_type: None,
        }
    }
}

impl<S> ListenerOptions<S> {
    pub fn once() -> Self {
        Self {
            once: true,
            ..Self::default()
        }
    }
}
