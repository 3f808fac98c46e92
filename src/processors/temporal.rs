use crate::error::{AqError, Result};
use crate::models::AirQualityRecord;
use chrono::{Datelike, NaiveDate};

/// Fill `date` and `weekday` (Monday = 0) on every record that lacks them.
///
/// Values that are already present are never recomputed, so repeated calls
/// are no-ops. Returns the number of records that gained a derived field.
pub fn derive_temporal_fields(records: &mut [AirQualityRecord]) -> Result<usize> {
    let mut derived = 0;

    for record in records.iter_mut() {
        if record.has_derived_fields() {
            continue;
        }

        let date = match record.date {
            Some(date) => date,
            None => record.calendar_date().ok_or(AqError::InvalidDate {
                year: record.year,
                month: record.month,
                day: record.day,
            })?,
        };

        record.date = Some(date);
        if record.weekday.is_none() {
            record.weekday = Some(date.weekday().num_days_from_monday());
        }
        derived += 1;
    }

    Ok(derived)
}

/// Records observed on `target`, lazily
pub fn filter_by_date<'a, I>(records: I, target: NaiveDate) -> impl Iterator<Item = &'a AirQualityRecord>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    records.into_iter().filter(move |r| r.date() == Some(target))
}

pub fn filter_by_year<'a, I>(records: I, year: i32) -> impl Iterator<Item = &'a AirQualityRecord>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    records.into_iter().filter(move |r| r.year == year)
}

/// Case-insensitive station filter
pub fn filter_by_station<'a, 'b, I>(
    records: I,
    station: &'b str,
) -> impl Iterator<Item = &'a AirQualityRecord> + 'b
where
    'a: 'b,
    I: IntoIterator<Item = &'a AirQualityRecord> + 'b,
    I::IntoIter: 'b,
{
    records
        .into_iter()
        .filter(move |r| r.station.eq_ignore_ascii_case(station))
}

/// Earliest and latest observation dates
pub fn date_bounds<'a, I>(records: I) -> Option<(NaiveDate, NaiveDate)>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    records
        .into_iter()
        .filter_map(|r| r.date())
        .fold(None, |bounds, date| match bounds {
            None => Some((date, date)),
            Some((min, max)) => Some((min.min(date), max.max(date))),
        })
}

pub fn year_bounds<'a, I>(records: I) -> Option<(i32, i32)>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    records
        .into_iter()
        .map(|r| r.year)
        .fold(None, |bounds, year| match bounds {
            None => Some((year, year)),
            Some((min, max)) => Some((min.min(year), max.max(year))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<AirQualityRecord> {
        vec![
            AirQualityRecord::new(2013, 3, 1, 0, "Dongsi"),
            AirQualityRecord::new(2013, 3, 1, 1, "Tiantan"),
            AirQualityRecord::new(2013, 3, 2, 0, "Dongsi"),
            AirQualityRecord::new(2014, 1, 5, 12, "Dongsi"),
        ]
    }

    #[test]
    fn test_derive_sets_date_and_weekday() -> Result<()> {
        let mut records = sample_records();
        let derived = derive_temporal_fields(&mut records)?;

        assert_eq!(derived, 4);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2013, 3, 1));
        // 2013-03-01 was a Friday
        assert_eq!(records[0].weekday, Some(4));
        // 2014-01-05 was a Sunday
        assert_eq!(records[3].weekday, Some(6));
        Ok(())
    }

    #[test]
    fn test_derive_is_idempotent() -> Result<()> {
        let mut once = sample_records();
        derive_temporal_fields(&mut once)?;

        let mut twice = once.clone();
        let derived = derive_temporal_fields(&mut twice)?;

        assert_eq!(derived, 0);
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_derive_keeps_existing_date() -> Result<()> {
        let mut records = vec![AirQualityRecord::new(2013, 3, 1, 0, "Dongsi")];
        let preset = NaiveDate::from_ymd_opt(2013, 3, 4).unwrap();
        records[0].date = Some(preset);

        derive_temporal_fields(&mut records)?;

        assert_eq!(records[0].date, Some(preset));
        assert_eq!(records[0].weekday, Some(0));
        Ok(())
    }

    #[test]
    fn test_derive_rejects_impossible_date() {
        let mut records = vec![AirQualityRecord::new(2013, 2, 29, 0, "Dongsi")];
        let err = derive_temporal_fields(&mut records).unwrap_err();
        assert!(matches!(err, AqError::InvalidDate { month: 2, day: 29, .. }));
    }

    #[test]
    fn test_filter_by_date() {
        let records = sample_records();
        let target = NaiveDate::from_ymd_opt(2013, 3, 1).unwrap();

        let matched: Vec<_> = filter_by_date(&records, target).collect();
        assert_eq!(matched.len(), 2);

        let nothing = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(filter_by_date(&records, nothing).count(), 0);
    }

    #[test]
    fn test_filter_by_year_and_station() {
        let records = sample_records();

        assert_eq!(filter_by_year(&records, 2013).count(), 3);
        assert_eq!(filter_by_year(&records, 1999).count(), 0);
        assert_eq!(filter_by_station(&records, "dongsi").count(), 3);
    }

    #[test]
    fn test_bounds() {
        let records = sample_records();

        assert_eq!(
            date_bounds(&records),
            Some((
                NaiveDate::from_ymd_opt(2013, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2014, 1, 5).unwrap()
            ))
        );
        assert_eq!(year_bounds(&records), Some((2013, 2014)));
        assert_eq!(date_bounds(&Vec::<AirQualityRecord>::new()), None);
    }
}
