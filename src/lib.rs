//! Pine Script v6 static analysis tool: CLI entry point, layered
//! configuration, and process wiring around `pinelint-core`,
//! `pinelint-tools`, and `pinelint-server`.

pub mod config;
