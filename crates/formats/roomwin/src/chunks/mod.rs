//! Typed parsers for individual chunk formats.

pub mod bgnd;
pub mod code;
pub mod gen8;
pub mod objt;
pub mod room;
pub mod seqn;
pub mod sprt;
