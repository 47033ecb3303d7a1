//! Host templating engine adapters.

mod minijinja;

pub use minijinja::MiniJinjaEngine;
