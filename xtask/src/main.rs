use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const CORE_PACKAGE: &str = "mock_compute_core";
const LAMBDA_PACKAGE: &str = "mock_compute_lambda";
const LAMBDA_BINARY: &str = "mock_compute_lambda";
const CORE_BENCH: &str = "computation";

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the mock compute worker workspace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the unit tests of the worker crates
    Test,
    /// Run the synthetic computation benchmark
    Bench {
        /// Save the results under this Criterion baseline name
        #[arg(long, conflicts_with = "baseline")]
        save_baseline: Option<String>,
        /// Compare the results against a previously saved baseline
        #[arg(long)]
        baseline: Option<String>,
    },
    /// Formatting, clippy and tests
    Ci,
    /// Build the worker for Lambda and zip it as `bootstrap`
    Package {
        /// Lambda architecture to build for
        #[arg(value_enum, long, default_value_t = LambdaArch::X86_64)]
        arch: LambdaArch,
        /// Directory receiving the zip artifact
        #[arg(long, default_value = "target/lambda")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LambdaArch {
    #[value(name = "x86_64")]
    X86_64,
    Arm64,
}

impl LambdaArch {
    fn target_triple(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64-unknown-linux-gnu",
            Self::Arm64 => "aarch64-unknown-linux-gnu",
        }
    }

    fn lambda_name(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "arm64",
        }
    }
}

fn cargo(args: &[&str]) -> Result<(), String> {
    eprintln!("+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(|error| format!("failed to execute cargo: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("`cargo {}` exited with {status}", args.join(" ")))
    }
}

fn run_tests() -> Result<(), String> {
    cargo(&["test", "-p", CORE_PACKAGE])?;
    cargo(&["test", "-p", LAMBDA_PACKAGE])
}

fn run_bench(save_baseline: Option<&str>, baseline: Option<&str>) -> Result<(), String> {
    let mut args = vec!["bench", "-p", CORE_PACKAGE, "--bench", CORE_BENCH];
    match (save_baseline, baseline) {
        (Some(name), _) => args.extend(["--", "--save-baseline", name]),
        (None, Some(name)) => args.extend(["--", "--baseline", name]),
        (None, None) => {}
    }
    cargo(&args)
}

fn run_ci() -> Result<(), String> {
    cargo(&["fmt", "--all", "--", "--check"])?;
    cargo(&["clippy", "--all-targets", "--", "-D", "warnings"])?;
    run_tests()
}

fn package(arch: LambdaArch, out_dir: &Path) -> Result<PathBuf, String> {
    let target = arch.target_triple();
    cargo(&[
        "build",
        "--release",
        "-p",
        LAMBDA_PACKAGE,
        "--bin",
        LAMBDA_BINARY,
        "--target",
        target,
    ])?;

    let binary_path = Path::new("target")
        .join(target)
        .join("release")
        .join(LAMBDA_BINARY);
    let binary = fs::read(&binary_path)
        .map_err(|error| format!("failed to read '{}': {error}", binary_path.display()))?;

    fs::create_dir_all(out_dir)
        .map_err(|error| format!("failed to create '{}': {error}", out_dir.display()))?;
    let zip_path = out_dir.join(format!("mock_compute-{}.zip", arch.lambda_name()));
    write_bootstrap_zip(&binary, &zip_path)
        .map_err(|error| format!("failed to write '{}': {error}", zip_path.display()))?;
    Ok(zip_path)
}

/// Lambda custom runtimes start the executable named `bootstrap`.
fn write_bootstrap_zip(binary: &[u8], zip_path: &Path) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(fs::File::create(zip_path)?);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)?;
    zip.write_all(binary)?;
    zip.finish()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Test => run_tests(),
        Commands::Bench {
            save_baseline,
            baseline,
        } => run_bench(save_baseline.as_deref(), baseline.as_deref()),
        Commands::Ci => run_ci(),
        Commands::Package { arch, out_dir } => package(arch, &out_dir).map(|zip_path| {
            eprintln!(
                "packaged {} for the {} Lambda architecture",
                zip_path.display(),
                arch.lambda_name()
            );
        }),
    };

    if let Err(message) = outcome {
        eprintln!("xtask: {message}");
        exit(1);
    }
}
