//! Voice score screen with a daily allowance and a signup unlock.
//!
//! The gate state lives in a JSON file in the system temp directory, so
//! running the demo again on the same day continues the count.
//!
//! ```text
//! RUST_LOG=attempt_gate=debug cargo run --example voice_crush -- hi
//! ```

use attempt_gate::{AttemptGate, FileStore, GateDecision, SignupGate, VoicePrompts, VoiceScore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::temp_dir().join("voice-crush-demo.json");
    let store = FileStore::open(&path)?;
    let gate = AttemptGate::builder()
        .with_threshold(3)
        .with_key_prefix("voice-crush:")
        .with_store(store)
        .build()?;
    let screen = SignupGate::new(gate);

    println!("=== Voice Crush ===");
    println!("State file: {}\n", path.display());

    // Screen mount
    let device = screen.gate().ensure_identity();
    println!("Device: {}", device);
    if let Some(status) = screen.status(&device) {
        println!("Analyses left today: {}/{}\n", status.remaining, status.threshold);
    }

    let language = std::env::args().nth(1).unwrap_or_else(|| "en".to_string());
    let mut rng = StdRng::from_entropy();
    for tap in 1..=5 {
        println!(
            "Tap #{}: {} \"{}\"",
            tap,
            VoicePrompts::instruction(&language),
            VoicePrompts::pick(&mut rng, &language)
        );
        match screen.check(&device) {
            GateDecision::Allowed => {
                if let Some(status) = screen.status(&device) {
                    println!("  daily allowance used: {:.0}%", status.progress() * 100.0);
                }
                for value in VoiceScore::countdown(&mut rng, 5) {
                    println!("  analysing... {}", value);
                }
                let score = VoiceScore::generate(&mut rng);
                println!("  {}% - {}", score.score(), score.verdict());
                println!("  {}", score.hint());
            }
            GateDecision::Blocked => {
                println!("  Daily limit reached. Sign up to keep going.");
                break;
            }
        }
    }

    println!("\nSigning up...");
    screen.complete_signup(&device);

    for tap in 1..=2 {
        let decision = screen.check(&device);
        println!("Registered tap #{}: {:?}", tap, decision);
    }

    let snapshot = screen.gate().metrics().snapshot();
    println!("\n=== Metrics ===");
    println!("Allowed: {}", snapshot.attempts_allowed);
    println!("Blocked: {}", snapshot.attempts_blocked);
    println!("Resets: {}", snapshot.resets);
    println!("Storage errors: {}", snapshot.storage_errors);

    Ok(())
}
