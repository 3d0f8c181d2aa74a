//! Current-time tool

use crate::Tool;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::Value;
use toolhost_core::{Error, Result};
use toolhost_llm::tools::schema;

const SECONDS_PER_HOUR: i32 = 3600;

/// `get_current_time() -> "YYYY-MM-DD HH:MM:SS +HH:MM"`
///
/// Reports wall-clock time at a fixed UTC offset (JST, +09:00, by default).
#[derive(Debug, Clone, Copy)]
pub struct ClockTool {
    offset: FixedOffset,
}

impl ClockTool {
    /// Clock at `hours` east of UTC
    pub fn new(hours: i32) -> Result<Self> {
        let offset = hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| Error::Config(format!("Invalid UTC offset: {hours} hours")))?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Render `instant` in this clock's offset
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format("%Y-%m-%d %H:%M:%S %:z")
            .to_string()
    }
}

impl Default for ClockTool {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(9 * SECONDS_PER_HOUR).unwrap_or_else(|| Utc.fix()),
        }
    }
}

#[async_trait]
impl Tool for ClockTool {
    async fn execute(&self, _params: Value) -> Result<Value> {
        Ok(Value::String(self.format(Utc::now())))
    }

    fn name(&self) -> &'static str {
        "get_current_time"
    }

    fn description(&self) -> &'static str {
        "Get the current date and time, including the UTC offset."
    }

    fn input_schema(&self) -> Value {
        schema::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_in_jst() {
        let clock = ClockTool::default();
        let instant = Utc.with_ymd_and_hms(2025, 1, 31, 20, 30, 5).unwrap();
        assert_eq!(clock.format(instant), "2025-02-01 05:30:05 +09:00");
    }

    #[test]
    fn test_negative_offset() {
        let clock = ClockTool::new(-5).unwrap();
        let instant = Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap();
        assert_eq!(clock.format(instant), "2025-05-31 22:00:00 -05:00");
    }

    #[test]
    fn test_invalid_offset() {
        assert!(ClockTool::new(30).is_err());
    }

    #[tokio::test]
    async fn test_execute_returns_string() {
        let out = ClockTool::default().execute(Value::Null).await.unwrap();
        let text = out.as_str().unwrap();
        assert!(text.ends_with("+09:00"));
        assert_eq!(text.len(), "2025-01-01 00:00:00 +09:00".len());
    }
}
