//! Arithmetic macros built from emitter primitives.
//!
//! Each macro documents which cells must be zero on entry. Nothing checks
//! this: a macro expanded over dirty cells computes a wrong value silently.

use crate::emitter::Emitter;

/// Number of cells [`Emitter::print_decimal`] uses as workspace.
pub const PRINT_WORKSPACE: usize = 14;

/// Repeated-subtraction divmod for the window `n d r q` starting at the
/// dividend. Leaves `d - n%d` in the divisor cell, `n%d` in `r` and `n/d` in
/// `q`, and ends back on the dividend. Reads the cell two past `q` as a zero
/// sentinel.
const DIVMOD_LOOP: &str = "[->-[>+>>]>[+[-<+>]>+>>]<<<<<]";

impl Emitter {
    /// Set a zero cell to `value`.
    pub fn set(&mut self, cell: usize, value: usize) {
        self.increment(cell, value);
    }

    /// `dst += src; src = 0`. Requires `dst == 0`.
    pub fn move_value(&mut self, src: usize, dst: usize) {
        self.while_nonzero(src, |e| {
            e.decrement(src, 1);
            e.increment(dst, 1);
        });
    }

    /// `dst = src`, leaving `src` intact. Requires `dst == 0` and `tmp == 0`;
    /// `tmp` is zero again afterwards.
    pub fn copy(&mut self, src: usize, dst: usize, tmp: usize) {
        self.while_nonzero(src, |e| {
            e.decrement(src, 1);
            e.increment(dst, 1);
            e.increment(tmp, 1);
        });
        self.move_value(tmp, src);
    }

    /// `result = a * b`. Consumes `a`, preserves `b`. Requires
    /// `result == 0` and `tmp == 0`.
    pub fn multiply(&mut self, a: usize, b: usize, result: usize, tmp: usize) {
        self.while_nonzero(a, |e| {
            e.decrement(a, 1);
            e.while_nonzero(b, |e| {
                e.decrement(b, 1);
                e.increment(result, 1);
                e.increment(tmp, 1);
            });
            e.move_value(tmp, b);
        });
    }

    /// Divide `base+1` by ten over the window `base..=base+5`.
    ///
    /// On entry `base+1` holds the dividend and the other five cells, plus
    /// the sentinel `base+6`, are zero. On exit `base+3` holds the remainder,
    /// `base+4` the quotient, and every other cell of the window is zero.
    pub fn divmod10(&mut self, base: usize) {
        self.set(base + 2, 10);
        self.goto(base + 1);
        self.splice(DIVMOD_LOOP, base + 1);
        // The divisor cell is left holding 10 - remainder.
        self.clear(base + 2);
    }

    /// Write `cell` as a zero cell set to `byte`, then clear it again.
    pub fn print_byte(&mut self, cell: usize, byte: u8) {
        self.set(cell, usize::from(byte));
        self.write(cell);
        self.clear(cell);
    }

    pub fn print_bytes(&mut self, cell: usize, bytes: &[u8]) {
        for &b in bytes {
            self.print_byte(cell, b);
        }
    }

    /// Turn a digit value into its ASCII character, write it, and zero the cell.
    fn print_digit(&mut self, cell: usize) {
        self.increment(cell, usize::from(b'0'));
        self.write(cell);
        self.clear(cell);
    }

    /// Print `value` (0..=255) in decimal without leading zeros, consuming it.
    ///
    /// Uses `ws..ws + PRINT_WORKSPACE`, which must be zero on entry and is
    /// zero again on exit.
    pub fn print_decimal(&mut self, value: usize, ws: usize) {
        let ones = ws + 3;
        let tens = ws + 9;
        let hundreds = ws + 10;
        let flag_h = ws + 12;
        let flag_t = ws + 13;

        self.move_value(value, ws + 1);
        self.divmod10(ws);
        self.move_value(ws + 4, ws + 7);
        self.divmod10(ws + 6);

        self.set(flag_h, 1);
        self.set(flag_t, 1);

        // Three digits: clears both flags.
        self.while_nonzero(hundreds, |e| {
            e.decrement(flag_h, 1);
            e.decrement(flag_t, 1);
            e.print_digit(hundreds);
            e.print_digit(tens);
            e.print_digit(ones);
        });

        self.while_nonzero(flag_h, |e| {
            e.decrement(flag_h, 1);

            // Two digits.
            e.while_nonzero(tens, |e| {
                e.decrement(flag_t, 1);
                e.print_digit(tens);
                e.print_digit(ones);
            });

            // One digit, including a literal zero.
            e.while_nonzero(flag_t, |e| {
                e.decrement(flag_t, 1);
                e.print_digit(ones);
            });
        });
    }
}
