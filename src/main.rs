//! isotest self-check runner
//!
//! Registers demonstration suites and runs them through the harness. `--scenario` picks the suites; the same
//! arguments reach every isolated child, so parent and children always build the same registry.

use std::io::{self, Write};
use std::process;

use clap::{Parser, ValueEnum};
use isotest::cli::{self, HarnessArgs};
use isotest::version::ISOTEST_VERSION;
use isotest::{Registry, RegistryBuilder};

#[derive(Parser, Debug)]
#[command(name = "isotest")]
#[command(version = ISOTEST_VERSION)]
#[command(about = "Run the isotest demonstration suites, one process per case", long_about = None)]
struct Args {
    /// Which demonstration suites to register
    #[arg(long, value_enum, default_value_t = Scenario::Showcase)]
    scenario: Scenario,

    #[command(flatten)]
    harness: HarnessArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Suite "Math": one passing case, one that aborts
    Math,
    /// A single ungrouped case with a failing assertion
    Assertion,
    /// Cases that exercise output capture
    Capture,
    /// Only passing cases
    Green,
    /// Every suite above
    Showcase,
}

fn main() {
    cli::init_tracing();
    let args = Args::parse();
    cli::run(build_registry(args.scenario), &args.harness);
}

fn build_registry(scenario: Scenario) -> Registry {
    let builder = Registry::builder();
    let builder = match scenario {
        Scenario::Math => math(builder),
        Scenario::Assertion => assertion(builder),
        Scenario::Capture => capture(builder),
        Scenario::Green => green(builder),
        // Ungrouped cases must come before the first suite is opened.
        Scenario::Showcase => capture(math(green(assertion(builder)))),
    };
    builder.build()
}

fn assertion(builder: RegistryBuilder) -> RegistryBuilder {
    builder.case("rejects an empty name", || {
        let name = std::hint::black_box("");
        assert!(!name.is_empty(), "name must not be empty");
    })
}

fn green(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .suite("Strings")
        .case("concatenates", || assert_eq!(format!("{}{}", "iso", "test"), "isotest"))
        .case("splits on whitespace", || {
            let words: Vec<_> = "one two  three".split_whitespace().collect();
            assert_eq!(words, ["one", "two", "three"]);
        })
        .suite("Vectors")
        .case("starts empty", || assert!(Vec::<u8>::new().is_empty()))
}

fn math(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .suite("Math")
        .case("adds", || assert_eq!(2 + 3, 5))
        .case("divides by zero", divide_by_zero)
}

/// Integer division by zero is a panic in Rust; abort instead so the case dies the way a hardware fault would.
fn divide_by_zero() {
    let divisor = std::hint::black_box(0u32);
    match 10u32.checked_div(divisor) {
        Some(quotient) => println!("quotient: {quotient}"),
        None => process::abort(),
    }
}

fn capture(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .suite("Capture")
        .case("reports what it printed", || {
            print!("hello\ntest");
            let _ = io::stdout().flush();
            process::exit(3);
        })
        .case("floods stdout", || {
            let mut out = io::stdout().lock();
            for _ in 0..1_000 {
                let _ = out.write_all(b"0123456789");
            }
            let _ = out.flush();
        })
        .case("panics after printing", || {
            println!("about to fail");
            panic!("boom");
        })
}
