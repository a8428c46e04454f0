pub mod ai;
pub mod checker;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod docs;
pub mod extractor;
pub mod frontmatter;
pub mod graph;
pub mod hasher;
pub mod matchers;
pub mod model;
pub mod planner;
pub mod resolver;
pub mod scan;
pub mod util;
