use log::warn;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;

use crate::error::Error;
use crate::interpreter::{Interpreter, RunConfig};

/// Largest derivative coefficient the calculator can print.
pub const MAX_COEFFICIENT: u32 = 255;

/// Derivative coefficients of `Σ coeffs[i]·x^i`, constant term first.
pub fn derivative(coeffs: &[u8]) -> Vec<u32> {
    (1u32..)
        .zip(coeffs.iter().skip(1))
        .map(|(k, &c)| u32::from(c) * k)
        .collect()
}

/// Render coefficients in the calculator's I/O shape. An empty list is the
/// zero polynomial and renders as `"0\n"`.
pub fn format_coefficients(coeffs: &[u32]) -> String {
    if coeffs.is_empty() {
        return "0\n".to_string();
    }
    let mut out = coeffs
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    out.push('\n');
    out
}

/// One (input, expected output) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    pub input: String,
    pub expected: String,
    pub description: String,
}

impl Case {
    /// A case with an explicit expectation. A missing trailing newline is
    /// added to the input.
    pub fn new(input: &str, expected: &str, description: &str) -> Self {
        let mut input = input.to_string();
        if !input.ends_with('\n') {
            input.push('\n');
        }
        Self {
            input,
            expected: expected.to_string(),
            description: description.to_string(),
        }
    }

    /// A case whose expectation comes from [`derivative`].
    pub fn from_coefficients(coeffs: &[u8], description: &str) -> Self {
        let input = coeffs
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(
            &input,
            &format_coefficients(&derivative(coeffs)),
            description,
        )
    }
}

/// The fixed regression suite.
pub fn standard_cases() -> Vec<Case> {
    let mut cases = vec![
        Case::new("7", "0\n", "constant -> 0"),
        Case::new("1 5", "5\n", "linear"),
        Case::new("1 5 3", "5 6\n", "quadratic"),
        Case::new("1 5 0 3", "5 0 9\n", "cubic"),
        Case::new("0 0 1", "0 2\n", "x^2"),
        Case::new("0 1", "1\n", "x"),
        Case::new("0", "0\n", "zero constant"),
        Case::new("0 0 0 2", "0 0 6\n", "2x^3"),
        Case::new("9 9 9", "9 18\n", "two-digit result"),
        Case::new("0 0 0 0 1", "0 0 0 4\n", "x^4"),
        Case::new(
            "0 0 0 0 0 0 0 0 0 9",
            "0 0 0 0 0 0 0 0 81\n",
            "9x^9 -> 81x^8",
        ),
        Case::new("1 1", "1\n", "x+1"),
        Case::new("4 3 2", "3 4\n", "2x^2+3x+4"),
        Case::new("0 0 0 0 0 5", "0 0 0 0 25\n", "5x^5 -> 25x^4"),
        Case::new("0 0 0", "0 0\n", "zero polynomial degree 2"),
        Case::new("1 1 1 1 1 1", "1 2 3 4 5\n", "sum of x^k"),
    ];

    let input = "0 ".repeat(28) + "9";
    let expected = vec!["0"; 27].join(" ") + " 252\n";
    cases.push(Case::new(
        &input,
        &expected,
        "9x^28 -> 252x^27 (three-digit)",
    ));
    cases
}

/// `count` seeded random polynomials whose derivative fits in one cell.
///
/// Each term's digit is capped so that `digit * exponent <= 255`.
pub fn random_cases(count: usize, seed: u64, max_degree: usize) -> Vec<Case> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let degree = rng.gen_range(0..=max_degree);
            let coeffs: Vec<u8> = (0..=degree)
                .map(|k| {
                    let cap = u8::try_from(MAX_COEFFICIENT as usize / k.max(1))
                        .map_or(9, |c| c.min(9));
                    rng.gen_range(0..=cap)
                })
                .collect();
            Case::from_coefficients(&coeffs, &format!("random #{i} (degree {degree})"))
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail { actual: String },
    Error(Error),
}

#[derive(Clone, Debug)]
pub struct CaseResult {
    pub case: Case,
    pub outcome: Outcome,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}

/// Results in the same order as the cases that produced them.
#[derive(Clone, Debug, Default)]
pub struct Report {
    pub results: Vec<CaseResult>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Run every case against `interpreter` in parallel.
///
/// Each case gets its own machine state, so results are independent of
/// scheduling.
pub fn run_cases(interpreter: &Interpreter, cases: &[Case], config: &RunConfig) -> Report {
    let results = cases
        .par_iter()
        .map(|case| {
            let outcome = match interpreter.run(case.input.as_bytes(), config) {
                Ok(exec) if exec.output == case.expected => Outcome::Pass,
                Ok(exec) => Outcome::Fail {
                    actual: exec.output,
                },
                Err(e) => Outcome::Error(e),
            };
            if outcome != Outcome::Pass {
                warn!("case {:?} failed: {outcome:?}", case.description);
            }
            CaseResult {
                case: case.clone(),
                outcome,
            }
        })
        .collect();
    Report { results }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::generate;

    fn harness_config() -> RunConfig {
        RunConfig {
            max_steps: 10_000_000,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_derivative_reference() {
        assert_eq!(derivative(&[1, 5, 0, 3]), vec![5, 0, 9]);
        assert_eq!(derivative(&[7]), Vec::<u32>::new());
        assert_eq!(derivative(&[]), Vec::<u32>::new());
    }

    #[test]
    fn test_derivative_exponents_start_at_one() {
        let mut coeffs = vec![0u8; 29];
        coeffs[28] = 9;
        let d = derivative(&coeffs);
        assert_eq!(d.len(), 28);
        assert_eq!(d[27], 252);
        assert!(d[..27].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_format_coefficients() {
        assert_eq!(format_coefficients(&[]), "0\n");
        assert_eq!(format_coefficients(&[9, 18]), "9 18\n");
    }

    #[test]
    fn test_case_appends_newline() {
        let case = Case::new("1 5", "5\n", "linear");
        assert_eq!(case.input, "1 5\n");
        let case = Case::new("1 5\n", "5\n", "linear");
        assert_eq!(case.input, "1 5\n");
    }

    #[test]
    fn test_standard_cases_agree_with_reference() {
        for case in standard_cases() {
            let coeffs: Vec<u8> = case
                .input
                .split_whitespace()
                .map(|d| d.parse().unwrap())
                .collect();
            assert_eq!(
                format_coefficients(&derivative(&coeffs)),
                case.expected,
                "{}",
                case.description
            );
        }
    }

    #[test]
    fn test_random_cases_are_seeded() {
        assert_eq!(random_cases(10, 7, 12), random_cases(10, 7, 12));
    }

    #[test]
    fn test_random_cases_stay_in_range() {
        for case in random_cases(200, 1, 40) {
            for c in case.expected.split_whitespace() {
                let c: u32 = c.parse().unwrap();
                assert!(c <= MAX_COEFFICIENT, "{}: {}", case.description, c);
            }
        }
    }

    #[test]
    fn test_generated_program_passes_standard_suite() {
        let interp = Interpreter::from_program(generate()).unwrap();
        let report = run_cases(&interp, &standard_cases(), &harness_config());
        for r in &report.results {
            assert!(r.passed(), "{}: {:?}", r.case.description, r.outcome);
        }
        assert_eq!(report.passed(), 17);
    }

    #[test]
    fn test_generated_program_passes_random_suite() {
        let interp = Interpreter::from_program(generate()).unwrap();
        let report = run_cases(&interp, &random_cases(50, 2024, 30), &harness_config());
        assert!(report.all_passed(), "{:?}", report.results);
    }

    #[test]
    fn test_report_counts_failures_and_errors() {
        let interp = Interpreter::load(",.").unwrap();
        let cases = vec![
            Case::new("a", "a", "echo"),
            Case::new("b", "c", "mismatch"),
        ];
        let report = run_cases(&interp, &cases, &harness_config());
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.results[1].outcome,
            Outcome::Fail {
                actual: "b".to_string()
            }
        );

        let looping = Interpreter::load("+[]").unwrap();
        let report = run_cases(&looping, &cases[..1], &RunConfig {
            max_steps: 50,
            ..RunConfig::default()
        });
        assert!(matches!(
            report.results[0].outcome,
            Outcome::Error(Error::BudgetExceeded { .. })
        ));
    }
}
