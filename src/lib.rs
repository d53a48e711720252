//! This library analyzes compiled [EVM](https://ethereum.org/en/developers/docs/evm/)
//! bytecode and execution traces to attribute gas cost to exact source-code
//! locations, detect wasteful patterns, and reconstruct a contract's storage
//! state over time. It is a _best effort_ analysis aimed at contract authors
//! who want to see *why* a function is expensive and *what* changed in
//! storage after each operation.
//!
//! Note that this library is not an EVM interpreter: it never executes
//! bytecode, only decodes it and accounts for gas statically or from a
//! supplied trace. Nor does it perform formal verification or symbolic
//! execution.
//!
//! # How it Works
//!
//! From a very high level, one analysis session proceeds as follows:
//!
//! 1. The deployed bytecode is decoded into a
//!    [`disassembly::InstructionStream`], with inline push data skipped and
//!    unassigned bytes kept as [`opcode::Mnemonic::Unknown`] so that
//!    decoding is total.
//! 2. The compiler's differential source map is expanded by
//!    [`source_map::SourceMap::parse`] into one entry per instruction.
//! 3. The [`analyzer::GasAnalyzer`] fuses the two with the static gas
//!    schedule — refined by a runtime trace where one is available — into a
//!    ranked, deduplicated list of [`analyzer::hotspot::GasHotspot`]s with
//!    severities and recommendations.
//! 4. A [`tour::TourNavigator`] sequences the user through that list, most
//!    severe hotspot first.
//! 5. Independently, a [`state::StateReconstructor`] folds the `SSTORE`s of
//!    execution traces, attributed against the compiler's storage layout,
//!    into an append-only history of [`state::snapshot::StateSnapshot`]s.
//!
//! # Basic Usage
//!
//! ```
//! use gas_attribution_analyzer::{
//!     analyzer::{Config, GasAnalyzer},
//!     tour::{TourEvent, TourNavigator},
//! };
//!
//! // PUSH1 0x01, PUSH1 0x00, SSTORE — a minimal storage write, with all
//! // three instructions mapped to the same source range.
//! let analyzer = GasAnalyzer::new("0x6001600055", "0:10:0:-;;", Config::default());
//! let report = analyzer.analyze().unwrap();
//!
//! assert_eq!(report.hotspots.len(), 1);
//! assert!(report.hotspots[0].gas_used >= 20_000);
//!
//! let mut tour = TourNavigator::new();
//! let TourEvent::StepChanged(step) = tour.start(report.hotspots) else {
//!     panic!("the tour should start");
//! };
//! assert_eq!((step.position, step.total), (1, 1));
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod abi;
pub mod analyzer;
pub mod constant;
pub mod contract;
pub mod disassembly;
pub mod error;
pub mod opcode;
pub mod source_map;
pub mod state;
pub mod tour;
pub mod trace;
pub mod utility;

// Re-exports to provide the library interface.
pub use analyzer::{AnalysisReport, GasAnalyzer};
pub use contract::CompiledArtifact;
pub use state::StateReconstructor;
pub use tour::TourNavigator;
pub use trace::ExecutionTrace;
