//! Console walkthrough against the offline engine: template parsing,
//! control classification, operator setters, and apply/revert.
//!
//! Run with: cargo run -p aircast-console --example offline_demo
//!
//! Set `RUST_LOG=debug` to watch the routing decisions.

use aircast_console::{Console, ConsoleOptions};
use aircast_core::offline::{ElementSpec, OfflineEngine};
use aircast_core::{MediaGraph, TargetPath};

const TEMPLATE: &str = "\
avsrc name=stream ! \
amplifier amplification[audio.gain]=1.0 ! \
titleoverlay name=piece_title text[text.piece]=ready ypos[posY.piece]=0.9 hide[text.hide]=false ! \
avsink";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let template = dir.path().join("demo.pipe");
    std::fs::write(&template, TEMPLATE)?;

    let engine = OfflineEngine::new()
        .with_element(ElementSpec::new("avsrc"))
        .with_element(ElementSpec::new("amplifier").with_controllable("amplification", 1.0))
        .with_element(
            ElementSpec::new("titleoverlay")
                .with_property("text", "")
                .with_property("ypos", 0.9)
                .with_property("hide", true),
        )
        .with_element(ElementSpec::new("avsink"));

    let mut console = Console::start(&engine, ConsoleOptions::new(&template))?;

    println!("=== Classified channels ===\n");
    for channel in console.registry().channels() {
        println!(
            "{:<12} {} interpolated, {} settable",
            channel.channel(),
            channel.interpolated().len(),
            channel.settable().len()
        );
    }

    console.run(true);

    println!("\n=== Operator moves ===\n");
    console.set_text("piece", "Overture");
    console.set_a_gain(-6.0);
    console.show_text(true);

    let text = console
        .graph()
        .property(&TargetPath::new("piece_title", "text"))
        .expect("overlay text");
    println!("overlay text now: {text}");

    let gain_source = console
        .registry()
        .channel("audio.gain")
        .expect("gain channel")
        .interpolated()[0]
        .source();
    let (at, factor) = *console
        .graph()
        .scheduled_points(gain_source)
        .expect("gain points")
        .last()
        .expect("at least the seed point");
    println!("gain ramp: factor {factor:.4} at t={}s", at.as_secs_f64());

    println!("\n=== Apply / revert ===\n");
    console.set_text_position("piece", 0.2);
    println!("position before revert: {:?}", console.text_position("piece")?);
    console.revert()?;
    println!("position after revert:  {:?}", console.text_position("piece")?);

    console.teardown()?;
    Ok(())
}
