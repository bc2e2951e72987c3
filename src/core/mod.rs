//! Runtime core: the settlement engine and its two front ends.
//!
//! - [`settle`]: the free functions [`all`], [`all_settled`], [`any`], [`race`];
//! - [`combinators`]: [`Combinators`], the same operations with event fan-out;
//! - [`engine`]: observer wiring, the decision guard and the policy loop;
//! - [`config`] / [`builder`]: construction of [`Combinators`].

mod builder;
mod combinators;
mod config;
mod engine;
mod settle;

pub use builder::CombinatorsBuilder;
pub use combinators::Combinators;
pub use config::Config;
pub use engine::settle_with;
pub use settle::{all, all_settled, any, race};
