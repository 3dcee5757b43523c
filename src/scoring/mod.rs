//! Rule-based and template-based gesture scoring

pub mod gesture_class;
pub mod rules;
pub mod template;

pub use gesture_class::{difficulty_prefix, rule_key, GestureClass};
pub use rules::{HandAxes, RuleScorer};
pub use template::{ReferenceTemplate, TemplateLibrary, TemplateScorer, MAX_TOTAL_DISTANCE};
