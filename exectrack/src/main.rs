//! # exectrack - Main Entry Point
//!
//! Supports three operational modes:
//! - **Tracking** (default): load the tracepoint, log a snapshot every `--interval` seconds
//! - **Program listing** (`--programs`): print loaded BPF programs
//! - **Map listing** (`--maps <ID>`): print the maps of one loaded program

use anyhow::Result;
use clap::Parser;
use log::info;

use exectrack::cli::Args;
use exectrack::inventory::{list_maps, list_programs};
use exectrack::preflight::{check_privileges, run_preflight_checks};
use exectrack::tracking::{run_until, termination_signal, ExecProbe, LogSink, Poller, Tracker};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    std::process::exit(match run(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied") || msg.contains("requires root") {
        EXIT_NOPERM
    } else if msg.contains("no loaded program") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn print_programs() -> Result<()> {
    check_privileges()?;
    let programs = list_programs()?;
    println!("{} programs loaded", programs.len());
    for program in &programs {
        println!("{program}");
    }
    Ok(())
}

fn print_maps(program_id: u32) -> Result<()> {
    check_privileges()?;
    let maps = list_maps(program_id)?;
    println!("program {program_id}: {} maps", maps.len());
    for map in &maps {
        println!("{map}");
    }
    Ok(())
}

#[tokio::main]
async fn run(args: Args) -> Result<()> {
    if args.programs {
        return print_programs();
    }
    if let Some(program_id) = args.maps {
        return print_maps(program_id);
    }

    run_preflight_checks(&args.object)?;

    // Load/attach failures are fatal; attach failure has already rolled back the load
    let tracker = Tracker::open_with(|| ExecProbe::load(&args.object))?;

    info!("Starting process execution tracker...");
    info!("Press Ctrl+C to exit");

    let running = Poller::new(tracker, LogSink, args.poll_interval()).start();
    run_until(running, termination_signal()).await
}
