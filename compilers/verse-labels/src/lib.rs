pub mod gazetteer;
pub mod resolver;
pub mod rules;
pub mod spans;

pub use resolver::{resolve, Label, Predicate, Signal};
pub use rules::{Category, CategoryConfig, RuleError, RuleSet, RuleSetConfig};
pub use spans::{build_spans, SpanConfig};
