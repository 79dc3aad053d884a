// UI module - command loop
//
// This module contains:
// - CommandController: reads commands from stdin and dispatches them to the
//   scan runner and the timer

pub mod controller;

pub use controller::{Command, CommandController, CommandResponse, Flow, command_table};
