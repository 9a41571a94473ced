use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HolidayType {
    Public,
    Company,
}

impl HolidayType {
    pub fn as_str(&self) -> &str {
        match self {
            HolidayType::Public => "public",
            HolidayType::Company => "company",
        }
    }
}

/// A date exempted from absence marking and reminders.
/// Recurring holidays match on month/day every year.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Holiday {
    pub id: u64,
    #[schema(example = "Christmas Day")]
    pub name: String,
    #[schema(example = "2024-12-25", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "public")]
    pub holiday_type: String,
    pub is_recurring: bool,
}

impl Holiday {
    pub fn matches(&self, date: NaiveDate) -> bool {
        if self.date == date {
            return true;
        }
        self.is_recurring && self.date.month() == date.month() && self.date.day() == date.day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holiday(date: NaiveDate, is_recurring: bool) -> Holiday {
        Holiday {
            id: 1,
            name: "Christmas Day".into(),
            date,
            holiday_type: "public".into(),
            is_recurring,
        }
    }

    #[test]
    fn recurring_matches_any_year() {
        let h = holiday(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(), true);
        assert!(h.matches(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
        assert!(h.matches(NaiveDate::from_ymd_opt(2030, 12, 25).unwrap()));
        assert!(!h.matches(NaiveDate::from_ymd_opt(2030, 12, 24).unwrap()));
    }

    #[test]
    fn exact_matches_stored_year_only() {
        let h = holiday(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(), false);
        assert!(h.matches(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
        assert!(!h.matches(NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()));
    }
}
