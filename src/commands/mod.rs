//! Builtin command descriptors.
//!
//! Every builtin runtime operation (`Graphics`, `Cls`, `KeyDown`...) is
//! described by a [`CommandDescriptor`]: where it lives in the runtime,
//! what argument types it expects, how its arguments are rewritten, and
//! whether calling it suspends the program.
//!
//! The lexer uses the table to classify words as commands, the parser uses
//! it for argument checks, and the code generator lowers every command
//! through it. The core never hard-codes command behaviour.
//!
//! # Target Shapes
//!
//! | Category | `target` | Emitted as |
//! |---|---|---|
//! | `Call` | `graphics.cls` | `$graphics.cls(args)` |
//! | `Property` | `input.mouseX` | `$input.mouseX` |
//! | `Inline` | `Math.abs({0})` | `Math.abs(x)` |
//! | `Unsupported` | ignored | nothing |

mod devices;
mod standard;

pub use devices::{Device, mouse_button, scancode_key};

use crate::lexer::Keyword;
use crate::semantic::ValueType;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Name of the frame-presentation primitive.
pub const FRAME_PRIMITIVE: &str = "flip";

/// How a command is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCategory {
    /// Runtime method call.
    Call,
    /// Target-language template with `{n}` placeholders.
    Inline,
    /// Runtime property read, no call.
    Property,
    /// No usable mapping; emits nothing.
    Unsupported,
}

/// A compile-time rewrite of a command's argument list.
///
/// Transforms run in order on the already-lowered argument text.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgTransform {
    /// Supplies `value` when fewer than `index + 1` arguments were given.
    Default { index: usize, value: String },
    /// Rebuilds the list as `args[i]` for each listed index.
    Reorder(Vec<usize>),
    /// Converts a numeric flag to a real boolean.
    BooleanCoerce { index: usize },
    /// Translates a scancode or mouse button number.
    DeviceCode { index: usize, device: Device },
}

impl ArgTransform {
    /// Applies this transform to lowered arguments.
    pub fn apply(&self, args: &mut Vec<String>) {
        match self {
            ArgTransform::Default { index, value } => {
                while args.len() < *index {
                    args.push("undefined".to_string());
                }
                if args.len() == *index {
                    args.push(value.clone());
                }
            }
            ArgTransform::Reorder(order) => {
                let reordered = order.iter().filter_map(|&i| args.get(i).cloned()).collect();
                *args = reordered;
            }
            ArgTransform::BooleanCoerce { index } => {
                if let Some(arg) = args.get_mut(*index) {
                    *arg = match arg.as_str() {
                        "0" | "false" => "false".to_string(),
                        "1" | "true" => "true".to_string(),
                        other => format!("!!({})", other),
                    };
                }
            }
            ArgTransform::DeviceCode { index, device } => {
                if let Some(arg) = args.get_mut(*index) {
                    *arg = device.translate(arg);
                }
            }
        }
    }

    /// Highest argument index this transform touches.
    fn max_index(&self) -> Option<usize> {
        match self {
            ArgTransform::Default { index, .. }
            | ArgTransform::BooleanCoerce { index }
            | ArgTransform::DeviceCode { index, .. } => Some(*index),
            ArgTransform::Reorder(order) => order.iter().copied().max(),
        }
    }
}

/// Describes one builtin command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDescriptor {
    /// Runtime path (`graphics.cls`) or inline template.
    pub target: String,
    /// Declared parameter types; `Unknown` accepts anything.
    pub params: Vec<ValueType>,
    /// Type of the value the command produces.
    pub returns: ValueType,
    /// Argument rewrites, applied in order.
    pub transforms: Vec<ArgTransform>,
    /// Whether a call must be awaited.
    pub suspends: bool,
    /// Emission shape: call, property read, inline template or nothing.
    pub category: CommandCategory,
}

impl CommandDescriptor {
    fn with_category(target: &str, category: CommandCategory) -> Self {
        Self {
            target: target.to_string(),
            params: Vec::new(),
            returns: ValueType::Unknown,
            transforms: Vec::new(),
            suspends: false,
            category,
        }
    }

    /// A runtime method call.
    pub fn call(target: &str) -> Self {
        Self::with_category(target, CommandCategory::Call)
    }

    /// An inline template.
    pub fn inline(template: &str) -> Self {
        Self::with_category(template, CommandCategory::Inline)
    }

    /// A runtime property read.
    pub fn property(target: &str) -> Self {
        Self::with_category(target, CommandCategory::Property)
    }

    /// A command with no mapping.
    pub fn unsupported() -> Self {
        Self::with_category("", CommandCategory::Unsupported)
    }

    /// Sets the parameter types.
    pub fn params(mut self, params: impl IntoIterator<Item = ValueType>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Sets the return type.
    pub fn returns(mut self, returns: ValueType) -> Self {
        self.returns = returns;
        self
    }

    /// Appends an argument transform.
    pub fn transform(mut self, transform: ArgTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Marks the command as suspending.
    pub fn suspending(mut self) -> Self {
        self.suspends = true;
        self
    }

    /// Runs every transform over lowered argument text.
    pub fn apply_transforms(&self, mut args: Vec<String>) -> Vec<String> {
        for transform in &self.transforms {
            transform.apply(&mut args);
        }
        args
    }

    /// Fills an inline template's `{n}` placeholders.
    ///
    /// Missing arguments become `undefined`.
    pub fn render_inline(&self, args: &[String]) -> String {
        let mut out = String::with_capacity(self.target.len());
        let mut rest = self.target.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}').map(|close| (close, after[..close].parse::<usize>())) {
                Some((close, Ok(index))) => {
                    out.push_str(args.get(index).map(String::as_str).unwrap_or("undefined"));
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Placeholder indices used by an inline template.
    fn placeholders(&self) -> Vec<usize> {
        self.target
            .split('{')
            .skip(1)
            .filter_map(|part| part.split_once('}'))
            .filter_map(|(inner, _)| inner.parse().ok())
            .collect()
    }
}

/// A problem found by [`CommandTable::validate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("command `{name}` is shadowed by a keyword")]
    ShadowedByKeyword { name: String },

    #[error("command `{name}` has an empty target")]
    EmptyTarget { name: String },

    #[error("command `{name}` transforms argument {index}, beyond its {arity} parameters")]
    TransformOutOfRange {
        name: String,
        index: usize,
        arity: usize,
    },

    #[error("command `{name}` template uses placeholder {{{index}}}, beyond its {arity} parameters")]
    PlaceholderOutOfRange {
        name: String,
        index: usize,
        arity: usize,
    },
}

/// Maps lower-case command names to descriptors.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: HashMap<String, CommandDescriptor>,
}

lazy_static::lazy_static! {
    static ref STANDARD: CommandTable = standard::build();
}

impl CommandTable {
    /// A table with no commands.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shared standard table.
    pub fn standard() -> &'static CommandTable {
        &STANDARD
    }

    /// Adds or replaces a command. The name is stored lower-cased.
    pub fn insert(&mut self, name: &str, descriptor: CommandDescriptor) -> Option<CommandDescriptor> {
        self.commands.insert(name.to_ascii_lowercase(), descriptor)
    }

    /// Looks up a command case-insensitively.
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(&name.to_ascii_lowercase())
    }

    /// Returns true if `name` is a command.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if the table has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every command that must be awaited, plus the frame primitive.
    pub fn suspending_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self
            .commands
            .iter()
            .filter(|(_, d)| d.suspends)
            .map(|(name, _)| name.clone())
            .collect();
        names.insert(FRAME_PRIMITIVE.to_string());
        names
    }

    /// Checks every descriptor for internal consistency.
    pub fn validate(&self) -> Result<(), Vec<TableError>> {
        let mut errors = Vec::new();

        let mut names: Vec<_> = self.commands.keys().collect();
        names.sort();

        for name in names {
            let descriptor = &self.commands[name];
            let owned = || name.to_string();

            if Keyword::lookup(name).is_some() {
                errors.push(TableError::ShadowedByKeyword { name: owned() });
            }
            if descriptor.category != CommandCategory::Unsupported
                && descriptor.target.trim().is_empty()
            {
                errors.push(TableError::EmptyTarget { name: owned() });
            }

            let arity = descriptor.params.len();
            for index in descriptor.transforms.iter().filter_map(ArgTransform::max_index) {
                if index >= arity {
                    errors.push(TableError::TransformOutOfRange {
                        name: owned(),
                        index,
                        arity,
                    });
                }
            }
            if descriptor.category == CommandCategory::Inline {
                for index in descriptor.placeholders() {
                    if index >= arity {
                        errors.push(TableError::PlaceholderOutOfRange {
                            name: owned(),
                            index,
                            arity,
                        });
                    }
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_standard_table_is_valid() {
        assert_eq!(CommandTable::standard().validate(), Ok(()));
    }

    #[test]
    fn test_standard_table_suspending_set() {
        let names = CommandTable::standard().suspending_names();
        for name in ["flip", "delay", "waitkey", "waitmouse", "waittimer", "input", "loadimage"] {
            assert!(names.contains(name), "{name} should suspend");
        }
        assert!(!names.contains("cls"));
    }

    #[test]
    fn test_frame_primitive_always_suspends() {
        let table = CommandTable::empty();
        assert!(table.suspending_names().contains(FRAME_PRIMITIVE));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = CommandTable::standard();
        assert!(table.contains("Graphics"));
        assert!(table.contains("CLS"));
        assert!(!table.contains("Player"));
    }

    #[test]
    fn test_validation_failures() {
        let mut table = CommandTable::empty();
        table.insert("while", CommandDescriptor::call("misc.while"));
        table.insert("nothing", CommandDescriptor::call(" "));
        table.insert(
            "rect2",
            CommandDescriptor::call("graphics.rect")
                .params([ValueType::Number])
                .transform(ArgTransform::BooleanCoerce { index: 3 }),
        );
        table.insert(
            "twice",
            CommandDescriptor::inline("({0} * {1})").params([ValueType::Number]),
        );
        table.insert("stop", CommandDescriptor::unsupported());

        let errors = table.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&TableError::ShadowedByKeyword { name: "while".into() }));
        assert!(errors.contains(&TableError::EmptyTarget { name: "nothing".into() }));
        assert!(errors.contains(&TableError::TransformOutOfRange {
            name: "rect2".into(),
            index: 3,
            arity: 1
        }));
        assert!(errors.contains(&TableError::PlaceholderOutOfRange {
            name: "twice".into(),
            index: 1,
            arity: 1
        }));
    }

    #[test]
    fn test_insert_folds_name_case() {
        let mut table = CommandTable::empty();
        table.insert("Beep", CommandDescriptor::call("audio.beep"));
        assert!(table.contains("beep"));
        assert!(table.contains("BEEP"));
        assert!(table.validate().is_ok());
        assert!(table.insert("beep", CommandDescriptor::unsupported()).is_some());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_default_transform_fills_missing_argument() {
        let descriptor = CommandDescriptor::call("graphics.rect")
            .params([ValueType::Number; 5])
            .transform(ArgTransform::Default {
                index: 4,
                value: "1".into(),
            })
            .transform(ArgTransform::BooleanCoerce { index: 4 });

        let args = descriptor.apply_transforms(strings(&["1", "2", "3", "4"]));
        assert_eq!(args, strings(&["1", "2", "3", "4", "true"]));

        let args = descriptor.apply_transforms(strings(&["1", "2", "3", "4", "solid"]));
        assert_eq!(args[4], "!!(solid)");
    }

    #[test]
    fn test_default_transform_pads_gaps() {
        let transform = ArgTransform::Default {
            index: 2,
            value: "0".into(),
        };
        let mut args = strings(&["a"]);
        transform.apply(&mut args);
        assert_eq!(args, strings(&["a", "undefined", "0"]));
    }

    #[test]
    fn test_reorder_transform() {
        let mut args = strings(&["a", "b", "c"]);
        ArgTransform::Reorder(vec![2, 0]).apply(&mut args);
        assert_eq!(args, strings(&["c", "a"]));
    }

    #[test]
    fn test_device_code_transform() {
        let mut args = strings(&["1"]);
        ArgTransform::DeviceCode {
            index: 0,
            device: Device::Keyboard,
        }
        .apply(&mut args);
        assert_eq!(args, strings(&["\"Escape\""]));
    }

    #[test]
    fn test_render_inline_template() {
        let descriptor = CommandDescriptor::inline("Math.atan2({0}, {1})");
        let rendered = descriptor.render_inline(&strings(&["y", "x"]));
        assert_eq!(rendered, "Math.atan2(y, x)");
        assert_eq!(descriptor.render_inline(&strings(&["y"])), "Math.atan2(y, undefined)");
    }

    #[test]
    fn test_render_inline_keeps_literal_braces() {
        let descriptor = CommandDescriptor::inline("({ v: {0} })");
        assert_eq!(descriptor.render_inline(&strings(&["1"])), "({ v: 1 })");
    }
}
