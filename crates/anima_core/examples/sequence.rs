//! Sequence Demo
//!
//! Builds a small title sequence and scrubs it forward and back:
//! - Three consecutive `between` windows, each with its own local time
//! - A `stretch` that plays the outro at half speed
//! - Cue events that fire when the playhead crosses them in either direction
//!
//! Run with: RUST_LOG=anima_core=trace cargo run -p anima_core --example sequence

use anima_core::{action, children, trigger, Container, ContainerConfig, Playhead};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut anim = Container::<f64>::with_config(ContainerConfig::new().label("titles"));

    let intro = anim.between(
        0.0,
        2.0,
        action(|t: f64| tracing::info!("intro fade {:.0}%", t / 2.0 * 100.0)),
    );
    let body = anim.between(
        2.0,
        5.0,
        action(|t: f64| tracing::info!("body scroll {:.2}", t)),
    );
    let outro_slow = anim.stretch(0.5, action(|t: f64| tracing::info!("outro at {:.2}", t)));
    let outro = anim.between(5.0, 7.0, outro_slow);

    let cue_body = anim.event(2.0, trigger(|| tracing::info!("cue: body")));
    let cue_outro = anim.event(5.0, trigger(|| tracing::info!("cue: outro")));

    let root = anim.parallel(children![intro, body, outro, cue_body, cue_outro]);

    let stats = anim.stats();
    tracing::info!(nodes = stats.total(), events = stats.event_count, "sequence built");

    let mut head = Playhead::new(-0.5);
    tracing::info!("scrubbing forward");
    while head.position() < 7.0 {
        head.step(&anim, root, 0.75);
    }

    tracing::info!("scrubbing back");
    while head.position() > 0.0 {
        head.step(&anim, root, -1.5);
    }
}
