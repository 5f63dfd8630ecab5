use crate::model::Cadence;
use serde::{Deserialize, Serialize};
use time::Month;

pub const REMINDER_HOUR: u8 = 9;

const QUARTER_STARTS: [Month; 4] = [Month::January, Month::April, Month::July, Month::October];

/// A repeating wall-clock point. `month == None` means every month;
/// `day == None` means every day of the matching month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    #[serde(default, with = "optional_month")]
    pub month: Option<Month>,
    #[serde(default)]
    pub day: Option<u8>,
    pub hour: u8,
    pub repeats: bool,
}

impl TriggerSpec {
    fn every_month(day: u8) -> Self {
        Self {
            month: None,
            day: Some(day),
            hour: REMINDER_HOUR,
            repeats: true,
        }
    }

    fn yearly(month: Month, day: u8) -> Self {
        Self {
            month: Some(month),
            day: Some(day),
            hour: REMINDER_HOUR,
            repeats: true,
        }
    }

    /// True when the wall-clock reading lands on this trigger point.
    pub fn matches(&self, month: Month, day: u8, hour: u8) -> bool {
        self.month.is_none_or(|wanted| wanted == month)
            && self.day.is_none_or(|wanted| wanted == day)
            && self.hour == hour
    }
}

pub fn due_in(cadence: Cadence, month: Month) -> bool {
    match cadence {
        Cadence::Monthly => true,
        Cadence::Quarterly => QUARTER_STARTS.contains(&month),
        Cadence::Annual => month == Month::January,
        Cadence::Spring | Cadence::Seasonal => month == Month::March,
        Cadence::Summer => month == Month::June,
        Cadence::Fall => month == Month::September,
        Cadence::Winter => month == Month::December,
        Cadence::Custom => false,
    }
}

pub fn due_months(cadence: Cadence) -> Vec<Month> {
    crate::model::ALL_MONTHS
        .into_iter()
        .filter(|month| due_in(cadence, *month))
        .collect()
}

/// Reminder trigger points for a cadence. Quarterly fans out to one spec per
/// quarter start because a sink request holds a single fixed point.
pub fn triggers(cadence: Cadence) -> Vec<TriggerSpec> {
    match cadence {
        Cadence::Monthly => vec![TriggerSpec::every_month(1)],
        Cadence::Quarterly => QUARTER_STARTS
            .into_iter()
            .map(|month| TriggerSpec::yearly(month, 1))
            .collect(),
        Cadence::Annual => vec![TriggerSpec::yearly(Month::January, 15)],
        Cadence::Spring => vec![TriggerSpec::yearly(Month::March, 15)],
        Cadence::Seasonal => vec![TriggerSpec::yearly(Month::March, 1)],
        Cadence::Summer => vec![TriggerSpec::yearly(Month::June, 15)],
        Cadence::Fall => vec![TriggerSpec::yearly(Month::September, 15)],
        Cadence::Winter => vec![TriggerSpec::yearly(Month::December, 1)],
        Cadence::Custom => Vec::new(),
    }
}

mod optional_month {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use time::Month;

    pub fn serialize<S: Serializer>(month: &Option<Month>, serializer: S) -> Result<S::Ok, S::Error> {
        match month {
            Some(month) => serializer.serialize_some(&u8::from(*month)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Month>, D::Error> {
        match Option::<u8>::deserialize(deserializer)? {
            Some(number) => Month::try_from(number)
                .map(Some)
                .map_err(|_| de::Error::custom(format!("month out of range: {number}"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{REMINDER_HOUR, TriggerSpec, due_in, due_months, triggers};
    use crate::model::{ALL_MONTHS, Cadence};
    use time::Month;

    #[test]
    fn quarterly_is_due_on_quarter_starts_only() {
        for month in ALL_MONTHS {
            let expected = matches!(
                month,
                Month::January | Month::April | Month::July | Month::October
            );
            assert_eq!(due_in(Cadence::Quarterly, month), expected, "{month}");
        }
    }

    #[test]
    fn monthly_is_due_every_month_and_custom_never() {
        assert_eq!(due_months(Cadence::Monthly).len(), 12);
        assert!(due_months(Cadence::Custom).is_empty());
    }

    #[test]
    fn single_month_cadences() {
        assert_eq!(due_months(Cadence::Annual), vec![Month::January]);
        assert_eq!(due_months(Cadence::Spring), vec![Month::March]);
        assert_eq!(due_months(Cadence::Seasonal), vec![Month::March]);
        assert_eq!(due_months(Cadence::Summer), vec![Month::June]);
        assert_eq!(due_months(Cadence::Fall), vec![Month::September]);
        assert_eq!(due_months(Cadence::Winter), vec![Month::December]);
    }

    #[test]
    fn quarterly_expands_to_four_triggers() {
        let specs = triggers(Cadence::Quarterly);
        let months: Vec<Option<Month>> = specs.iter().map(|spec| spec.month).collect();

        assert_eq!(specs.len(), 4);
        assert_eq!(
            months,
            vec![
                Some(Month::January),
                Some(Month::April),
                Some(Month::July),
                Some(Month::October)
            ]
        );
        assert!(specs.iter().all(|spec| spec.day == Some(1) && spec.repeats));
    }

    #[test]
    fn monthly_trigger_leaves_month_open() {
        let specs = triggers(Cadence::Monthly);

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].month, None);
        assert_eq!(specs[0].day, Some(1));
        assert_eq!(specs[0].hour, REMINDER_HOUR);
    }

    #[test]
    fn seasonal_anchors() {
        let anchor = |cadence| {
            let spec = triggers(cadence)[0];
            (spec.month, spec.day)
        };

        assert_eq!(anchor(Cadence::Annual), (Some(Month::January), Some(15)));
        assert_eq!(anchor(Cadence::Spring), (Some(Month::March), Some(15)));
        assert_eq!(anchor(Cadence::Seasonal), (Some(Month::March), Some(1)));
        assert_eq!(anchor(Cadence::Summer), (Some(Month::June), Some(15)));
        assert_eq!(anchor(Cadence::Fall), (Some(Month::September), Some(15)));
        assert_eq!(anchor(Cadence::Winter), (Some(Month::December), Some(1)));
    }

    #[test]
    fn custom_has_no_trigger() {
        assert!(triggers(Cadence::Custom).is_empty());
    }

    #[test]
    fn trigger_matches_wall_clock() {
        let monthly = triggers(Cadence::Monthly)[0];
        assert!(monthly.matches(Month::August, 1, 9));
        assert!(!monthly.matches(Month::August, 2, 9));
        assert!(!monthly.matches(Month::August, 1, 10));

        let winter = triggers(Cadence::Winter)[0];
        assert!(winter.matches(Month::December, 1, 9));
        assert!(!winter.matches(Month::November, 1, 9));
    }

    #[test]
    fn trigger_spec_serializes_month_number() {
        let spec = triggers(Cadence::Fall)[0];
        let json = serde_json::to_value(spec).unwrap();

        assert_eq!(json["month"], 9);
        assert_eq!(json["day"], 15);
        assert_eq!(json["hour"], 9);
        assert_eq!(json["repeats"], true);

        let back: TriggerSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }
}
