//! Configuration structures for bundling operations.
//!
//! [`Settings`] is the immutable description of one build; it is assembled
//! with [`SettingsBuilder`] (usually by the `pyproject.toml` loader) and
//! passed by reference to every stage.

mod arch;
mod builder;
mod command;
mod core;
mod package;
mod shortcut;

pub use arch::Arch;
pub use builder::SettingsBuilder;
pub use command::{CommandSpec, EntryPoint, Preamble};
pub use self::core::{DEFAULT_INDEX_URL, DEFAULT_PY_VERSION, ExtraFileSpec, Settings};
pub use package::PackageSettings;
pub use shortcut::ShortcutSpec;
