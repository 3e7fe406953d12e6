//! `pl-cli`: the `parley` terminal client.

pub mod cli;
