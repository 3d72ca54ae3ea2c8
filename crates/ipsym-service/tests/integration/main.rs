// See <https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html>
#![cfg(unix)]

pub mod dwarfdump;

pub use utils::*;
