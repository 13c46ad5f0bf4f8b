use crate::arith::PRINT_WORKSPACE;
use crate::emitter::Emitter;
use crate::isa::Program;

/// Cell roles of the derivative calculator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Nonzero while more coefficients follow.
    pub loop_flag: usize,
    /// Separator scratch, also used to print literal bytes.
    pub separator: usize,
    /// Current coefficient; consumed by the multiply.
    pub value: usize,
    /// Exponent of the current term; survives across iterations.
    pub multiplier: usize,
    pub product: usize,
    pub scratch: usize,
    /// One-shot guard for the "else" side of a separator test.
    pub branch_flag: usize,
    /// First of `PRINT_WORKSPACE` cells used by decimal printing.
    pub workspace: usize,
}

impl Layout {
    pub const DERIVATIVE: Layout = Layout {
        loop_flag: 0,
        separator: 1,
        value: 2,
        multiplier: 3,
        product: 4,
        scratch: 5,
        branch_flag: 6,
        workspace: 7,
    };

    /// One past the highest cell the program touches.
    pub fn cells(&self) -> usize {
        self.workspace + PRINT_WORKSPACE
    }
}

/// The derivative calculator as a bare instruction sequence.
pub fn generate() -> Program {
    assemble(&Layout::DERIVATIVE).finish()
}

/// The derivative calculator with a comment before each phase.
pub fn generate_annotated() -> String {
    assemble(&Layout::DERIVATIVE).source().to_string()
}

/// Emit the derivative calculator over `l`.
///
/// Reads digits separated by spaces, constant term first, and prints the
/// coefficients of the derivative in the same shape. A bare constant prints
/// `0` and reads nothing further.
pub fn assemble(l: &Layout) -> Emitter {
    let mut e = Emitter::new();

    e.comment("read and discard the constant term");
    e.read(l.loop_flag);
    e.clear(l.loop_flag);
    e.read(l.loop_flag);

    e.comment("separator is zero iff it was a space");
    e.decrement(l.loop_flag, usize::from(b' '));
    e.set(l.separator, 1);
    e.while_nonzero(l.loop_flag, |e| {
        e.decrement(l.separator, 1);
        e.clear(l.loop_flag);
    });

    e.comment("space: enter the main loop; otherwise the polynomial was a constant");
    e.set(l.branch_flag, 1);
    e.while_nonzero(l.separator, |e| {
        e.decrement(l.branch_flag, 1);
        e.decrement(l.separator, 1);
        e.increment(l.loop_flag, 1);
    });
    e.while_nonzero(l.branch_flag, |e| {
        e.decrement(l.branch_flag, 1);
        e.print_bytes(l.separator, b"0\n");
    });

    e.comment("main loop: one term per iteration");
    e.set(l.multiplier, 1);
    e.while_nonzero(l.loop_flag, |e| {
        e.decrement(l.loop_flag, 1);

        e.comment("coefficient times exponent");
        e.read(l.value);
        e.decrement(l.value, usize::from(b'0'));
        e.multiply(l.value, l.multiplier, l.product, l.scratch);
        e.print_decimal(l.product, l.workspace);
        e.increment(l.multiplier, 1);

        e.comment("next separator: a space continues and anything else ends the line");
        e.read(l.separator);
        e.decrement(l.separator, usize::from(b' '));
        e.set(l.branch_flag, 1);
        e.while_nonzero(l.separator, |e| {
            e.decrement(l.branch_flag, 1);
            e.clear(l.separator);
            e.print_byte(l.separator, b'\n');
        });
        e.while_nonzero(l.branch_flag, |e| {
            e.decrement(l.branch_flag, 1);
            e.increment(l.loop_flag, 1);
            e.print_byte(l.separator, b' ');
        });
    });

    e
}
