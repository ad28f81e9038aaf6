//! Built-in date and time injectors.
//!
//! Every built-in reads the shared [`Clock`], is non-critical and is listed
//! under the [`DATETIME_GROUP`] catalog group.
//!
//! | Code | Type | Formats (default first) |
//! |------|------|-------------------------|
//! | `current_date` | time | `DD/MM/YYYY`, `MM/DD/YYYY`, `YYYY-MM-DD`, `D MMMM YYYY` |
//! | `current_time` | time | `HH:mm`, `HH:mm:ss`, `hh:mm A` |
//! | `current_date_time` | time | `DD/MM/YYYY HH:mm`, `YYYY-MM-DD HH:mm:ss`, `RFC3339` |
//! | `current_year` | number | |
//! | `current_month` | number | |
//! | `current_day` | number | |

use crate::format::{RFC3339, strftime_pattern};
use crate::time::Clock;
use async_trait::async_trait;
use chrono::Datelike;
use quill_injector::{
    CancellationToken, FormatConfig, InjectableValue, Injector, InjectorError, InjectorRegistry,
    InjectorResult, RegistryError, ResolutionContext, TimeValue, ValueType,
};

/// Catalog group of the date/time built-ins.
pub const DATETIME_GROUP: &str = "datetime";

/// Code of the current-date injector.
pub const CURRENT_DATE: &str = "current_date";
/// Code of the current-time injector.
pub const CURRENT_TIME: &str = "current_time";
/// Code of the current date-and-time injector.
pub const CURRENT_DATE_TIME: &str = "current_date_time";
/// Code of the current-year injector.
pub const CURRENT_YEAR: &str = "current_year";
/// Code of the current-month injector.
pub const CURRENT_MONTH: &str = "current_month";
/// Code of the current-day-of-month injector.
pub const CURRENT_DAY: &str = "current_day";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Date,
    Time,
    DateTime,
    Year,
    Month,
    Day,
}

/// Injector producing one facet of the current instant.
#[derive(Debug, Clone)]
pub struct DateTimeInjector {
    code: &'static str,
    label: &'static str,
    part: Part,
    formats: Option<FormatConfig>,
    clock: Clock,
}

impl DateTimeInjector {
    fn new(code: &'static str, label: &'static str, part: Part, clock: Clock) -> Self {
        let formats = match part {
            Part::Date => Some(FormatConfig::new(
                "DD/MM/YYYY",
                ["DD/MM/YYYY", "MM/DD/YYYY", "YYYY-MM-DD", "D MMMM YYYY"],
            )),
            Part::Time => Some(FormatConfig::new("HH:mm", ["HH:mm", "HH:mm:ss", "hh:mm A"])),
            Part::DateTime => Some(FormatConfig::new(
                "DD/MM/YYYY HH:mm",
                ["DD/MM/YYYY HH:mm", "YYYY-MM-DD HH:mm:ss", RFC3339],
            )),
            Part::Year | Part::Month | Part::Day => None,
        };
        Self {
            code,
            label,
            part,
            formats,
            clock,
        }
    }

    /// Today's date.
    #[must_use]
    pub fn current_date(clock: Clock) -> Self {
        Self::new(CURRENT_DATE, "Current date", Part::Date, clock)
    }

    /// The current time of day.
    #[must_use]
    pub fn current_time(clock: Clock) -> Self {
        Self::new(CURRENT_TIME, "Current time", Part::Time, clock)
    }

    /// The current date and time.
    #[must_use]
    pub fn current_date_time(clock: Clock) -> Self {
        Self::new(CURRENT_DATE_TIME, "Current date and time", Part::DateTime, clock)
    }

    /// The current year as a number.
    #[must_use]
    pub fn current_year(clock: Clock) -> Self {
        Self::new(CURRENT_YEAR, "Current year", Part::Year, clock)
    }

    /// The current month (1-12) as a number.
    #[must_use]
    pub fn current_month(clock: Clock) -> Self {
        Self::new(CURRENT_MONTH, "Current month", Part::Month, clock)
    }

    /// The current day of the month as a number.
    #[must_use]
    pub fn current_day(clock: Clock) -> Self {
        Self::new(CURRENT_DAY, "Current day", Part::Day, clock)
    }
}

#[async_trait]
impl Injector for DateTimeInjector {
    fn code(&self) -> &str {
        self.code
    }

    fn data_type(&self) -> ValueType {
        match self.part {
            Part::Date | Part::Time | Part::DateTime => ValueType::Time,
            Part::Year | Part::Month | Part::Day => ValueType::Number,
        }
    }

    fn formats(&self) -> Option<FormatConfig> {
        self.formats.clone()
    }

    fn label(&self) -> String {
        self.label.to_string()
    }

    fn group(&self) -> Option<String> {
        Some(DATETIME_GROUP.to_string())
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        _cancel: CancellationToken,
    ) -> Result<Option<InjectorResult>, InjectorError> {
        let now = self.clock.now();

        let result = match (&self.formats, self.part) {
            (Some(formats), _) => {
                let selected = formats.select(ctx.selected_format(self.code));
                let mut value = TimeValue::new(now);
                if let Some(pattern) = strftime_pattern(selected) {
                    value = value.with_format(pattern);
                }
                InjectorResult::new(value)
                    .with_metadata("format", serde_json::Value::String(selected.to_string()))
            }
            (None, Part::Month) => InjectorResult::new(i64::from(now.month())),
            (None, Part::Day) => InjectorResult::new(i64::from(now.day())),
            (None, _) => InjectorResult::new(i64::from(now.year())),
        };

        Ok(Some(result))
    }
}

/// Registers every date/time built-in in `registry`.
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateCode`] if the registry already holds one
/// of the built-in codes.
pub fn register_builtin_injectors(
    registry: &mut InjectorRegistry,
    clock: Clock,
) -> Result<(), RegistryError> {
    let builtins = [
        DateTimeInjector::current_date(clock.clone()),
        DateTimeInjector::current_time(clock.clone()),
        DateTimeInjector::current_date_time(clock.clone()),
        DateTimeInjector::current_year(clock.clone()),
        DateTimeInjector::current_month(clock.clone()),
        DateTimeInjector::current_day(clock),
    ];
    for injector in builtins {
        registry.try_register(injector)?;
    }
    tracing::debug!(count = registry.len(), "registered built-in injectors");
    Ok(())
}
