//! Reference shower run from the command line.
//!
//! Usage:
//!   cargo run --example demo_loop -- [input.json] [output.json]
//!
//! Without an input file the reference input is used. The primaries are
//! 10 MeV photons, one per slot.

use std::process::ExitCode;

use lumen_bench::{reference_input, reference_primaries, reference_profile};
use lumen_engine::{RunInput, Termination, Transporter};

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let input = match args.next() {
        Some(path) => match RunInput::from_json_file(&path) {
            Ok(input) => input,
            Err(e) => {
                eprintln!("demo_loop: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => reference_input(42),
    };
    let output = args.next();

    println!("=== Lumen demo loop ===\n");
    println!(
        "slots={} max_steps={} seed={} space={:?}",
        input.track_slots, input.max_steps, input.seed, input.execution_space
    );

    let primaries = reference_primaries(input.track_slots, 10.0);
    let transporter = match Transporter::new(reference_profile(input)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("demo_loop: {e}");
            return ExitCode::FAILURE;
        }
    };
    let result = match transporter.run(&primaries) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("demo_loop: {e}");
            return ExitCode::FAILURE;
        }
    };

    match result.termination {
        Termination::Drained => println!("drained after {} steps", result.steps),
        Termination::StepBudgetExhausted { alive, pending } => {
            println!("stopped after {} steps: {alive} alive, {pending} pending", result.steps)
        }
    }
    println!(
        "deposited {:.3} MeV of {:.3} MeV",
        result.total_energy_deposition(),
        10.0 * primaries.len() as f64
    );
    for (particle, models) in &result.interactions {
        for (model, count) in models {
            println!("  {particle:>10} {model:<16} {count}");
        }
    }
    println!(
        "wall time {:.3} ms, fingerprint {:016x}",
        result.timing.total_us as f64 / 1000.0,
        result.fingerprint()
    );

    if let Some(path) = output {
        if let Err(e) = result.write_json(&path) {
            eprintln!("demo_loop: {e}");
            return ExitCode::FAILURE;
        }
        println!("wrote {path}");
    }
    ExitCode::SUCCESS
}
