use crate::interpreter::Execution;
use crate::isa::{ALPHABET, Instruction, Program};

/// Count each instruction, indexed as in [`ALPHABET`].
pub fn instruction_histogram(program: &[Instruction]) -> [usize; 8] {
    let mut hist = [0usize; 8];
    for ins in program {
        hist[ins.index()] += 1;
    }
    hist
}

/// Deepest loop nesting, ignoring any surplus `]`.
pub fn max_loop_depth(program: &[Instruction]) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    for ins in program {
        match ins {
            Instruction::LoopOpen => {
                depth += 1;
                max = max.max(depth);
            }
            Instruction::LoopClose => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Length of the program once every run of repeated `+`, `-`, `>` or `<`
/// counts as a single operation.
///
/// Emitted code is mostly such runs (pointer motion from the cursor,
/// constants such as `'0'`), so this is far shorter than the raw length.
pub fn collapsed_length(program: &[Instruction]) -> usize {
    let mut count = 0usize;
    let mut prev: Option<Instruction> = None;
    for &ins in program {
        let repeatable = matches!(
            ins,
            Instruction::Increment
                | Instruction::Decrement
                | Instruction::MoveRight
                | Instruction::MoveLeft
        );
        if !(repeatable && prev == Some(ins)) {
            count += 1;
        }
        prev = Some(ins);
    }
    count
}

/// Static summary of a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramStats {
    pub length: usize,
    pub histogram: [usize; 8],
    pub loops: usize,
    pub max_depth: usize,
    pub collapsed_length: usize,
}

impl ProgramStats {
    pub fn of(program: &Program) -> Self {
        let histogram = instruction_histogram(program);
        Self {
            length: program.len(),
            histogram,
            loops: histogram[Instruction::LoopOpen.index()],
            max_depth: max_loop_depth(program),
            collapsed_length: collapsed_length(program),
        }
    }

    /// Share of instructions that only move the data pointer.
    pub fn motion_ratio(&self) -> f64 {
        if self.length == 0 {
            return 0.0;
        }
        let motion = self.histogram[Instruction::MoveRight.index()]
            + self.histogram[Instruction::MoveLeft.index()];
        motion as f64 / self.length as f64
    }

    /// Human-readable report, one figure per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("instructions:      {}\n", self.length));
        for (c, n) in ALPHABET.iter().zip(self.histogram) {
            out.push_str(&format!("  {c}                {n}\n"));
        }
        out.push_str(&format!("loops:             {}\n", self.loops));
        out.push_str(&format!("max nesting depth: {}\n", self.max_depth));
        out.push_str(&format!("collapsed length:  {}\n", self.collapsed_length));
        out.push_str(&format!("pointer motion:    {:.1}%\n", self.motion_ratio() * 100.0));
        out
    }
}

/// Dynamic figures from one completed run.
pub fn render_run(exec: &Execution) -> String {
    format!(
        "steps:             {}\ninput consumed:    {}\noutput:            {:?}\n",
        exec.steps, exec.input_consumed, exec.output
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{Interpreter, RunConfig};

    #[test]
    fn test_histogram() {
        let program = Program::from_source("++>[-]<.,");
        let hist = instruction_histogram(&program);
        assert_eq!(hist, [1, 1, 2, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_histogram_empty() {
        let hist = instruction_histogram(&[]);
        assert_eq!(hist.iter().sum::<usize>(), 0);
    }

    #[test]
    fn test_max_loop_depth() {
        assert_eq!(max_loop_depth(&Program::from_source("+-")), 0);
        assert_eq!(max_loop_depth(&Program::from_source("[][]")), 1);
        assert_eq!(max_loop_depth(&Program::from_source("[[[]][]]")), 3);
        assert_eq!(max_loop_depth(&Program::from_source("]][")), 1);
    }

    #[test]
    fn test_collapsed_length() {
        assert_eq!(collapsed_length(&Program::from_source("")), 0);
        assert_eq!(collapsed_length(&Program::from_source("+++>>>")), 2);
        assert_eq!(collapsed_length(&Program::from_source("+-+-")), 4);
        // Brackets and I/O never merge.
        assert_eq!(collapsed_length(&Program::from_source("[[..,,]]")), 8);
    }

    #[test]
    fn test_motion_ratio() {
        let stats = ProgramStats::of(&Program::from_source(">>+<"));
        assert_eq!(stats.motion_ratio(), 0.75);
        assert_eq!(ProgramStats::of(&Program::default()).motion_ratio(), 0.0);
    }

    #[test]
    fn test_stats_of_generated_program() {
        let program = crate::assembler::generate();
        let stats = ProgramStats::of(&program);
        assert_eq!(stats.length, program.len());
        assert_eq!(stats.histogram.iter().sum::<usize>(), stats.length);
        assert_eq!(stats.loops, stats.histogram[Instruction::LoopClose.index()]);
        // main loop > print branch > guarded digits > clear
        assert!(stats.max_depth >= 4);
        assert!(stats.collapsed_length < stats.length);
        assert!(stats.render().contains("loops:"));
    }

    #[test]
    fn test_render_run() {
        let exec = Interpreter::load(",.")
            .unwrap()
            .run(b"xy", &RunConfig::default())
            .unwrap();
        let text = render_run(&exec);
        assert!(text.contains("steps:             2"), "{text}");
        assert!(text.contains("input consumed:    1"), "{text}");
    }
}
