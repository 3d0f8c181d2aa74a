//! Built-in local tools
//!
//! Small tools that need nothing but the process itself: integer
//! arithmetic and the current time.

pub mod clock;
pub mod math;

pub use clock::ClockTool;
pub use math::{add_numbers, multiply_numbers};

use crate::Tool;
use std::sync::Arc;

/// The calculator set: `add_numbers`, `multiply_numbers`, `get_current_time`
pub fn calculator_tools(clock: ClockTool) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(add_numbers()),
        Arc::new(multiply_numbers()),
        Arc::new(clock),
    ]
}
