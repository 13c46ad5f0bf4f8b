use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use tapederiv::assembler::{generate, generate_annotated};
use tapederiv::harness::{Outcome, random_cases, run_cases, standard_cases};
use tapederiv::interpreter::{Interpreter, RunConfig};
use tapederiv::isa::Program;
use tapederiv::metrics::{ProgramStats, render_run};

#[derive(Parser)]
#[command(
    name = "tapederiv",
    about = "Compile a polynomial derivative calculator to an 8-instruction tape machine, and run it"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Emit the derivative calculator program.
    Generate {
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Keep a comment line before each phase.
        #[arg(long)]
        annotated: bool,
    },

    /// Run a program file and print what it writes.
    Run {
        program: PathBuf,

        /// Input text fed to `,` instructions.
        #[arg(long, conflicts_with = "input_file")]
        input: Option<String>,

        /// Read the input bytes from a file.
        #[arg(long)]
        input_file: Option<PathBuf>,

        #[command(flatten)]
        machine: MachineArgs,
    },

    /// Check the derivative calculator against the regression suite.
    Test {
        /// Test this program file instead of a freshly generated one.
        #[arg(long)]
        program: Option<PathBuf>,

        /// Number of additional random polynomials.
        #[arg(long, default_value_t = 0)]
        random: usize,

        /// Random seed for reproducibility.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Highest degree of the random polynomials.
        #[arg(long, default_value_t = 28)]
        max_degree: usize,

        #[command(flatten)]
        machine: MachineArgs,
    },

    /// Print static statistics about a program.
    Stats {
        /// Analyse this program file instead of a freshly generated one.
        #[arg(long)]
        program: Option<PathBuf>,

        /// Also run the program on this input and report its step count.
        #[arg(long)]
        input: Option<String>,

        #[command(flatten)]
        machine: MachineArgs,
    },
}

#[derive(clap::Args)]
struct MachineArgs {
    /// Cell value range; arithmetic wraps modulo this.
    #[arg(long, default_value_t = 256)]
    cell_size: u32,

    /// Max instructions executed per run.
    #[arg(long, default_value_t = 10_000_000)]
    max_steps: u64,
}

impl MachineArgs {
    fn config(&self) -> RunConfig {
        RunConfig {
            cell_size: self.cell_size,
            max_steps: self.max_steps,
            ..RunConfig::default()
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate { output, annotated } => run_generate(output, annotated),
        Command::Run {
            program,
            input,
            input_file,
            machine,
        } => run_program(&program, input, input_file, &machine.config()),
        Command::Test {
            program,
            random,
            seed,
            max_degree,
            machine,
        } => run_tests(program, random, seed, max_degree, &machine.config()),
        Command::Stats {
            program,
            input,
            machine,
        } => run_stats(program, input, &machine.config()),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {e}", path.display()))
}

fn load_or_generate(path: Option<PathBuf>) -> Result<Program, String> {
    match path {
        Some(path) => Ok(Program::from_source(&read_file(&path)?)),
        None => Ok(generate()),
    }
}

fn run_generate(output: Option<PathBuf>, annotated: bool) -> Result<(), String> {
    let code = if annotated {
        generate_annotated()
    } else {
        generate().to_string()
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &code)
                .map_err(|e| format!("Cannot write {}: {e}", path.display()))?;
            info!("wrote {} characters to {}", code.len(), path.display());
        }
        None => println!("{code}"),
    }
    Ok(())
}

fn run_program(
    path: &Path,
    input: Option<String>,
    input_file: Option<PathBuf>,
    config: &RunConfig,
) -> Result<(), String> {
    let source = read_file(path)?;
    let input = match (input, input_file) {
        (Some(text), _) => text.into_bytes(),
        (None, Some(file)) => {
            std::fs::read(&file).map_err(|e| format!("Cannot read {}: {e}", file.display()))?
        }
        (None, None) => Vec::new(),
    };

    let interpreter = Interpreter::load(&source).map_err(|e| format!("Error: {e}"))?;
    match interpreter.run(&input, config) {
        Ok(exec) => {
            print!("{}", exec.output);
            info!("{} steps", exec.steps);
            Ok(())
        }
        Err(e) => {
            if let Some(partial) = e.partial_output() {
                print!("{partial}");
            }
            Err(format!("Error: {e}"))
        }
    }
}

fn run_tests(
    program: Option<PathBuf>,
    random: usize,
    seed: u64,
    max_degree: usize,
    config: &RunConfig,
) -> Result<(), String> {
    let program = load_or_generate(program)?;
    let interpreter = Interpreter::from_program(program).map_err(|e| format!("Error: {e}"))?;

    let mut cases = standard_cases();
    cases.extend(random_cases(random, seed, max_degree));

    let start = std::time::Instant::now();
    let report = run_cases(&interpreter, &cases, config);
    let elapsed = start.elapsed();

    for result in &report.results {
        let case = &result.case;
        match &result.outcome {
            Outcome::Pass => {
                println!("  PASS: {}", case.description);
                println!("        input={:?} -> {:?}", case.input, case.expected);
            }
            Outcome::Fail { actual } => {
                println!("  FAIL: {}", case.description);
                println!("        input={:?}", case.input);
                println!("        expected={:?}", case.expected);
                println!("        got     ={actual:?}");
            }
            Outcome::Error(e) => {
                println!("  ERROR: {}", case.description);
                println!("         input={:?}", case.input);
                println!("         {e}");
            }
        }
    }

    let total = report.results.len();
    println!(
        "\n{} passed, {} failed out of {total} tests",
        report.passed(),
        report.failed()
    );
    info!("suite finished in {elapsed:.2?}");

    if report.all_passed() {
        Ok(())
    } else {
        Err(format!("{} of {total} tests failed", report.failed()))
    }
}

fn run_stats(
    program: Option<PathBuf>,
    input: Option<String>,
    config: &RunConfig,
) -> Result<(), String> {
    let program = load_or_generate(program)?;
    print!("{}", ProgramStats::of(&program).render());

    if let Some(input) = input {
        let interpreter =
            Interpreter::from_program(program).map_err(|e| format!("Error: {e}"))?;
        let exec = interpreter
            .run(input.as_bytes(), config)
            .map_err(|e| format!("Error: {e}"))?;
        print!("{}", render_run(&exec));
    }
    Ok(())
}
