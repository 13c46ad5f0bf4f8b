use crate::isa::{Program, is_instruction};

/// Instruction builder with automatic pointer tracking.
///
/// Every operation names the cell it acts on; the emitter inserts the
/// pointer motion needed to get there. After any operation targeting cell
/// `c`, [`Emitter::cursor`] is `c`.
///
/// Loop brackets are not checked here. An unpaired bracket surfaces when the
/// interpreter loads the finished program.
#[derive(Clone, Debug, Default)]
pub struct Emitter {
    code: String,
    cursor: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell the data pointer will be on at this point of the program.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move to `cell` with the shortest run of `>` or `<`.
    pub(crate) fn goto(&mut self, cell: usize) {
        if cell > self.cursor {
            self.push_run('>', cell - self.cursor);
        } else if cell < self.cursor {
            self.push_run('<', self.cursor - cell);
        }
        self.cursor = cell;
    }

    pub fn increment(&mut self, cell: usize, n: usize) {
        self.goto(cell);
        self.push_run('+', n);
    }

    pub fn decrement(&mut self, cell: usize, n: usize) {
        self.goto(cell);
        self.push_run('-', n);
    }

    /// Zero `cell` whatever its value.
    pub fn clear(&mut self, cell: usize) {
        self.goto(cell);
        self.code.push_str("[-]");
    }

    pub fn read(&mut self, cell: usize) {
        self.goto(cell);
        self.code.push(',');
    }

    pub fn write(&mut self, cell: usize) {
        self.goto(cell);
        self.code.push('.');
    }

    pub fn loop_open(&mut self, cell: usize) {
        self.goto(cell);
        self.code.push('[');
    }

    pub fn loop_close(&mut self, cell: usize) {
        self.goto(cell);
        self.code.push(']');
    }

    /// Emit `body` inside a zero-test loop guarded by `cell`.
    ///
    /// The body must leave `cell` at zero for the loop to run once; this is
    /// how conditionals are expressed on the machine.
    pub fn while_nonzero(&mut self, cell: usize, body: impl FnOnce(&mut Self)) {
        self.loop_open(cell);
        body(self);
        self.loop_close(cell);
    }

    /// Append a free-text annotation. Instruction characters in `text` are
    /// replaced so the comment cannot change the program.
    pub fn comment(&mut self, text: &str) {
        if !self.code.is_empty() && !self.code.ends_with('\n') {
            self.code.push('\n');
        }
        self.code.push_str("# ");
        self.code
            .extend(text.chars().map(|c| if is_instruction(c) { '_' } else { c }));
        self.code.push('\n');
    }

    /// Append a fixed snippet whose net pointer motion is data-independent
    /// even if its interior motion is not. The snippet must start on the
    /// current cursor and finish on `exit`.
    pub(crate) fn splice(&mut self, code: &str, exit: usize) {
        self.code.push_str(code);
        self.cursor = exit;
    }

    /// The emitted text, annotations included.
    pub fn source(&self) -> &str {
        &self.code
    }

    /// The emitted program with annotations stripped.
    pub fn finish(self) -> Program {
        Program::from_source(&self.code)
    }

    fn push_run(&mut self, c: char, n: usize) {
        self.code.extend(std::iter::repeat_n(c, n));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{Interpreter, RunConfig};

    fn program_text(e: Emitter) -> String {
        e.finish().to_string()
    }

    #[test]
    fn test_goto_emits_minimal_motion() {
        let mut e = Emitter::new();
        e.increment(3, 1);
        e.decrement(1, 2);
        e.increment(1, 1);
        assert_eq!(program_text(e), ">>>+<<--+");
    }

    #[test]
    fn test_cursor_follows_target() {
        let mut e = Emitter::new();
        e.read(5);
        assert_eq!(e.cursor(), 5);
        e.write(2);
        assert_eq!(e.cursor(), 2);
        e.clear(2);
        assert_eq!(e.cursor(), 2);
        e.loop_open(7);
        e.loop_close(7);
        assert_eq!(e.cursor(), 7);
    }

    #[test]
    fn test_clear_shape() {
        let mut e = Emitter::new();
        e.clear(1);
        assert_eq!(program_text(e), ">[-]");
    }

    #[test]
    fn test_zero_count_emits_only_motion() {
        let mut e = Emitter::new();
        e.increment(2, 0);
        assert_eq!(program_text(e), ">>");
    }

    #[test]
    fn test_comment_cannot_inject_instructions() {
        let mut e = Emitter::new();
        e.comment("copy a -> b, then [print] it.");
        e.increment(0, 1);
        assert!(e.source().contains("# copy a _"));
        assert_eq!(program_text(e), "+");
    }

    #[test]
    fn test_while_nonzero_wraps_body() {
        let mut e = Emitter::new();
        e.increment(0, 2);
        e.while_nonzero(0, |e| {
            e.decrement(0, 1);
            e.increment(1, 3);
        });
        assert_eq!(e.cursor(), 0);
        let text = program_text(e);
        assert_eq!(text, "++[->+++<]");

        let exec = Interpreter::load(&text)
            .unwrap()
            .run(b"", &RunConfig::default())
            .unwrap();
        assert_eq!(exec.cell(1), 6);
    }

    #[test]
    fn test_splice_sets_cursor() {
        let mut e = Emitter::new();
        e.goto(1);
        e.splice("[>]", 4);
        assert_eq!(e.cursor(), 4);
        e.increment(5, 1);
        assert_eq!(program_text(e), ">[>]>+");
    }

    #[test]
    fn test_runtime_pointer_matches_cursor() {
        let mut e = Emitter::new();
        e.increment(4, 1);
        e.increment(2, 1);
        e.clear(9);
        let cursor = e.cursor();
        let exec = Interpreter::load(&program_text(e))
            .unwrap()
            .run(b"", &RunConfig::default())
            .unwrap();
        assert_eq!(exec.pointer, cursor);
    }
}
