//! 基本用法：带 scope 的监听、once 监听、移除与通道回收、可失败监听。
//!
//! 运行：`RUST_LOG=emit=trace cargo run -p emit --example emitter_basic`

use emit::{Binding, Emitter, ListenerOptions};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Widget {
    name: &'static str,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid quantity: {0}")]
struct InvalidQuantity(i64);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1) Emitter：以 Widget 作为回调上下文
    let emitter: Emitter<(&str, u32), Widget> = Emitter::new();
    let clicked = emitter.add(
        "click",
        |widget, (button, count)| {
            let name = widget.map_or("<none>", |w| w.name);
            println!("{name}: {button} x{count}");
        },
        ListenerOptions::builder()
            .scope(Widget { name: "ok-button" })
            .build(),
    );
    emitter.once("click", |_, _| println!("first click seen"));

    emitter.emit("click", &("left", 1));
    emitter.emit("click", &("left", 2));
    println!("listeners on click: {}", emitter.listener_count("click"));

    emitter.remove(&clicked);
    println!("click channel alive: {}", emitter.has_listeners("click"));
    emitter.emit("click", &("left", 3));

    // 2) 独立使用 Binding
    let resized: Binding<(u32, u32)> = Binding::new();
    resized.on(|_, (w, h)| println!("resized to {w}x{h}"));
    resized.set_active(false);
    resized.emit(&(800, 600));
    resized.set_active(true);
    resized.emit(&(1024, 768));

    // 3) 可失败监听：第一个错误中止本轮并携带事件类型返回
    let orders: Emitter<i64, (), Result<(), InvalidQuantity>> = Emitter::new();
    orders.on("order.placed", |_, qty| {
        if *qty > 0 {
            Ok(())
        } else {
            Err(InvalidQuantity(*qty))
        }
    });
    orders.try_emit("order.placed", &3)?;
    if let Err(err) = orders.try_emit("order.placed", &-1) {
        println!("rejected: {err}");
    }

    Ok(())
}
