//! charley: an Earley chart parser over token sequences, building a shared
//! packed parse forest for every input it accepts.
//!
//! The chart ([`chart`]) holds Earley items and local-ambiguity spans in
//! arenas addressed by integer handles; the driver ([`parser`]) runs the
//! predict/complete loop with Stolcke-style completion priorities and
//! spontaneous dot shift; [`forest`] answers acceptance, derivation-count,
//! and enumeration queries over the finished chart, cutting unit-production
//! cycles with three-colour DFS. Grammars come from [`grammar_file`] text or
//! the [`grammar`] API, and words meet their part-of-speech tags in
//! [`vocabulary`].

pub mod agenda;
pub mod builtin_grammars;
pub mod chart;
pub mod forest;
pub mod grammar;
pub mod grammar_file;
pub mod parser;
pub mod vocabulary;
