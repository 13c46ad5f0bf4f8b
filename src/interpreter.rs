use log::{debug, trace};

use crate::error::{Error, Result};
use crate::isa::{Instruction, Program};

/// Limits and machine parameters for a single run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Cells hold values in `[0, cell_size)`; arithmetic wraps.
    pub cell_size: u32,
    /// Maximum number of instructions executed before the run fails.
    pub max_steps: u64,
    /// Number of zero cells allocated up front.
    pub initial_tape_len: usize,
    /// Number of zero cells appended whenever the pointer passes the end.
    pub tape_growth: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cell_size: 256,
            max_steps: 1_000_000,
            initial_tape_len: 30_000,
            tape_growth: 1_000,
        }
    }
}

/// Bidirectional bracket match table.
///
/// `targets[i]` is the index of the bracket matching the one at `i`, or
/// `usize::MAX` if instruction `i` is not a bracket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JumpTable {
    targets: Vec<usize>,
}

impl JumpTable {
    /// Stack-based matching by nesting order. Fails on the first `]` with
    /// nothing open, or on the innermost `[` left open at the end.
    pub fn build(program: &[Instruction]) -> Result<Self> {
        let mut targets = vec![usize::MAX; program.len()];
        let mut stack = Vec::new();

        for (i, ins) in program.iter().enumerate() {
            match ins {
                Instruction::LoopOpen => stack.push(i),
                Instruction::LoopClose => {
                    let Some(open) = stack.pop() else {
                        return Err(Error::UnmatchedClose { position: i });
                    };
                    targets[open] = i;
                    targets[i] = open;
                }
                _ => {}
            }
        }

        if let Some(&open) = stack.last() {
            return Err(Error::UnmatchedOpen { position: open });
        }

        Ok(Self { targets })
    }

    pub fn target(&self, index: usize) -> Option<usize> {
        match self.targets.get(index) {
            Some(&t) if t != usize::MAX => Some(t),
            _ => None,
        }
    }

    /// Number of matched bracket pairs.
    pub fn pairs(&self) -> usize {
        self.targets.iter().filter(|&&t| t != usize::MAX).count() / 2
    }
}

/// The observable result of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Execution {
    pub output: String,
    pub steps: u64,
    /// The tape as it stood when the program ended.
    pub tape: Vec<u32>,
    /// Final data pointer.
    pub pointer: usize,
    /// Number of input bytes read before the input ran out or the program ended.
    pub input_consumed: usize,
}

impl Execution {
    /// Value of cell `index`, treating cells past the end of the tape as zero.
    pub fn cell(&self, index: usize) -> u32 {
        self.tape.get(index).copied().unwrap_or(0)
    }
}

/// A structurally valid program, ready to run any number of times.
#[derive(Clone, Debug)]
pub struct Interpreter {
    program: Program,
    jumps: JumpTable,
}

impl Interpreter {
    /// Strip comments from `source` and validate its brackets.
    pub fn load(source: &str) -> Result<Self> {
        Self::from_program(Program::from_source(source))
    }

    pub fn from_program(program: Program) -> Result<Self> {
        let jumps = JumpTable::build(&program)?;
        debug!(
            "loaded program: {} instructions, {} loops",
            program.len(),
            jumps.pairs()
        );
        Ok(Self { program, jumps })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Execute the program against `input` with fresh machine state.
    ///
    /// Once `input` is exhausted every read stores 0.
    pub fn run(&self, input: &[u8], config: &RunConfig) -> Result<Execution> {
        if config.cell_size == 0 {
            return Err(Error::InvalidCellSize);
        }
        let cell_size = config.cell_size;
        let growth = config.tape_growth.max(1);

        let mut tape = vec![0u32; config.initial_tape_len.max(1)];
        let mut ptr: usize = 0;
        let mut ip: usize = 0;
        let mut input_pos: usize = 0;
        let mut output = String::new();
        let mut steps: u64 = 0;

        let program: &[Instruction] = &self.program;
        while ip < program.len() {
            steps += 1;
            if steps > config.max_steps {
                return Err(Error::BudgetExceeded {
                    max_steps: config.max_steps,
                    partial_output: output,
                });
            }

            match program[ip] {
                Instruction::MoveRight => {
                    ptr += 1;
                    if ptr >= tape.len() {
                        tape.resize(tape.len() + growth, 0);
                    }
                }
                Instruction::MoveLeft => {
                    let Some(next) = ptr.checked_sub(1) else {
                        return Err(Error::OutOfBounds {
                            step: steps,
                            instruction: ip,
                        });
                    };
                    ptr = next;
                }
                Instruction::Increment => {
                    tape[ptr] = if tape[ptr] + 1 == cell_size {
                        0
                    } else {
                        tape[ptr] + 1
                    };
                }
                Instruction::Decrement => {
                    tape[ptr] = if tape[ptr] == 0 {
                        cell_size - 1
                    } else {
                        tape[ptr] - 1
                    };
                }
                Instruction::Write => {
                    output.push(char::from_u32(tape[ptr]).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                Instruction::Read => {
                    tape[ptr] = match input.get(input_pos) {
                        Some(&b) => {
                            input_pos += 1;
                            u32::from(b) % cell_size
                        }
                        None => 0,
                    };
                }
                Instruction::LoopOpen => {
                    if tape[ptr] == 0 {
                        ip = self.jump(ip);
                    }
                }
                Instruction::LoopClose => {
                    if tape[ptr] != 0 {
                        ip = self.jump(ip);
                    }
                }
            }
            ip += 1;
        }

        debug!(
            "run finished: {steps} steps, {} output chars, tape length {}",
            output.chars().count(),
            tape.len()
        );
        trace!("final pointer {ptr}, consumed {input_pos} input bytes");

        Ok(Execution {
            output,
            steps,
            tape,
            pointer: ptr,
            input_consumed: input_pos,
        })
    }

    fn jump(&self, ip: usize) -> usize {
        // Every bracket was matched at load time.
        self.jumps.target(ip).unwrap_or(ip)
    }
}

/// Load `source` and run it once, returning only the output.
pub fn execute(source: &str, input: &[u8], cell_size: u32, max_steps: u64) -> Result<String> {
    let config = RunConfig {
        cell_size,
        max_steps,
        ..RunConfig::default()
    };
    Interpreter::load(source)?
        .run(input, &config)
        .map(|execution| execution.output)
}
