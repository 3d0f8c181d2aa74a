//! Tool management and execution framework for toolhost
//!
//! A [`Tool`] is a named, described, schema-typed async callable. Tools are
//! collected in a [`ToolRegistry`], where names are unique, and only
//! registered tools can be invoked by an agent host.
//!
//! Tools can be written as a type implementing [`Tool`] or built from a
//! closure with [`FnTool`].

pub mod builtin;
pub mod function;
pub mod registry;
pub mod tool;

pub use function::FnTool;
pub use registry::ToolRegistry;
pub use tool::Tool;
