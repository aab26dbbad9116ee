use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::Command;

const EBPF_PACKAGE: &str = "exectrack-ebpf";
const EBPF_BINARY: &str = "exectrack";

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Parser)]
enum Cmd {
    /// Cross-compile the kernel object (always release)
    BuildEbpf {
        #[arg(long, default_value = "bpfel-unknown-none")]
        target: String,
    },
    /// Build both halves and run the tracker under sudo
    Run {
        #[arg(long, default_value = "bpfel-unknown-none")]
        target: String,
        /// Extra arguments passed to exectrack
        #[arg(last = true)]
        args: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Cmd::BuildEbpf { target } => {
            let object = build_ebpf(&target)?;
            println!("✓ eBPF object: {}", object.display());
        }
        Cmd::Run { target, args } => run(&target, &args)?,
    }

    Ok(())
}

/// Release only: debug builds pull in formatting code the BPF linker rejects.
fn build_ebpf(target: &str) -> Result<PathBuf> {
    let status = Command::new("cargo")
        .args(["+nightly", "build", "--package", EBPF_PACKAGE, "--target", target])
        .args(["-Z", "build-std=core", "--release"])
        .status()
        .context("Failed to spawn cargo for the eBPF build")?;

    if !status.success() {
        bail!("Failed to build eBPF program");
    }

    Ok(PathBuf::from("target").join(target).join("release").join(EBPF_BINARY))
}

fn run(target: &str, extra: &[String]) -> Result<()> {
    let object = build_ebpf(target)?;

    let status = Command::new("cargo")
        .args(["build", "--release", "--package", "exectrack"])
        .status()
        .context("Failed to spawn cargo for the userspace build")?;
    if !status.success() {
        bail!("Failed to build exectrack");
    }

    let status = Command::new("sudo")
        .arg("-E")
        .arg("target/release/exectrack")
        .arg("--object")
        .arg(&object)
        .args(extra)
        .status()
        .context("Failed to run exectrack")?;
    if !status.success() {
        bail!("exectrack exited with {status}");
    }

    Ok(())
}
