//! French date/time expression grammar.
//!
//! One set of patterns serves two callers: [`resolve_date_time`] turns the
//! highest-priority expression into an instant, and [`clause_starts`] reports
//! where every recognizable date clause begins so the title extractor can cut
//! it away.
//!
//! Expression families are tried in a fixed order and the first one found
//! wins:
//!
//! 1. relative day (`aujourd'hui`, `demain`, `après-demain`)
//! 2. relative offset (`dans N minutes|heures|jours`)
//! 3. weekday (`lundi` .. `dimanche`, optionally `prochain`/`suivant`)
//! 4. verbal date (`[pour] le D <mois> [YYYY]`)
//!
//! Minute and hour offsets are exact instants. Every other family yields a
//! calendar day whose time of day comes from an explicit clock time in the
//! text, or 09:00.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RELATIVE_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?P<today>aujourd['’]hui)|(?P<after>après[- ]demain)|(?P<tomorrow>demain)")
        .expect("valid relative day regex")
});
static OFFSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)dans\s+(\d+)\s+(minutes?|heures?|jours?)").expect("valid offset regex")
});
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(lundi|mardi|mercredi|jeudi|vendredi|samedi|dimanche)\s*(prochain|suivant)?")
        .expect("valid weekday regex")
});
static VERBAL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\bpour\s+)?\ble\s+(\d{1,2})\s+(janvier|février|fevrier|mars|avril|mai|juin|juillet|août|aout|septembre|octobre|novembre|décembre|decembre)(?:\s+(\d{4}))?",
    )
    .expect("valid verbal date regex")
});
static CLOCK_DIGIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\bà\s+)?(\d{1,2})h(\d{2})?").expect("valid digit clock regex")
});
static CLOCK_VERBAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bà\s+(\d{1,2})\s*heures?\s*(\d{2})?").expect("valid verbal clock regex")
});

/// Day markers relative to the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Today,
    Tomorrow,
    DayAfterTomorrow,
}

impl RelativeDay {
    pub fn offset_days(self) -> u64 {
        match self {
            RelativeDay::Today => 0,
            RelativeDay::Tomorrow => 1,
            RelativeDay::DayAfterTomorrow => 2,
        }
    }
}

/// Unit of a `dans N <unit>` offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Minutes,
    Hours,
    Days,
}

/// A recognized temporal expression, before resolution against `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalExpr {
    RelativeDay(RelativeDay),
    RelativeOffset { amount: i64, unit: OffsetUnit },
    Weekday { weekday: Weekday, next: bool },
    /// `month` is 1-based; `year` is `None` when the speaker omitted it.
    VerbalDate { day: u32, month: u32, year: Option<i32> },
}

/// Explicit time of day found in a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    /// Time of day used when the transcript names a day but no hour.
    pub const DEFAULT: ClockTime = ClockTime { hour: 9, minute: 0 };

    const MIDNIGHT: ClockTime = ClockTime { hour: 0, minute: 0 };
}

type Recognizer = fn(&str) -> Option<TemporalExpr>;

/// Recognizers in priority order.
const RECOGNIZERS: &[Recognizer] = &[
    recognize_relative_day,
    recognize_offset,
    recognize_weekday,
    recognize_verbal_date,
];

/// Resolve the first recognizable temporal expression in `text` to an instant.
///
/// Returns `None` when nothing is recognized, or when the expression cannot be
/// represented (e.g. an offset too large for the calendar).
pub fn resolve_date_time<Tz: TimeZone>(text: &str, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    recognize(text)?.resolve(find_clock_time(text), now)
}

/// Run the recognizers in priority order and return the first hit.
pub fn recognize(text: &str) -> Option<TemporalExpr> {
    RECOGNIZERS.iter().find_map(|recognizer| recognizer(text))
}

/// First explicit clock time: `14h30` style first, then `à 14 heures 30`.
pub fn find_clock_time(text: &str) -> Option<ClockTime> {
    CLOCK_DIGIT_RE
        .captures(text)
        .or_else(|| CLOCK_VERBAL_RE.captures(text))
        .and_then(|caps| {
            let hour = caps.get(1)?.as_str().parse().ok()?;
            let minute = caps
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            Some(ClockTime { hour, minute })
        })
}

/// Byte offsets where any date clause of any family begins, sorted.
///
/// Unlike [`recognize`], every occurrence of every family is reported.
pub fn clause_starts(text: &str) -> Vec<usize> {
    let patterns: [&Regex; 6] = [
        &*RELATIVE_DAY_RE,
        &*OFFSET_RE,
        &*CLOCK_DIGIT_RE,
        &*CLOCK_VERBAL_RE,
        &*WEEKDAY_RE,
        &*VERBAL_DATE_RE,
    ];
    let mut starts: Vec<usize> = patterns
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| m.start()))
        .collect();
    starts.sort_unstable();
    starts.dedup();
    starts
}

impl TemporalExpr {
    /// Resolve against `now`, applying `clock` to every family except minute
    /// and hour offsets.
    pub fn resolve<Tz: TimeZone>(
        &self,
        clock: Option<ClockTime>,
        now: &DateTime<Tz>,
    ) -> Option<DateTime<Tz>> {
        let tz = now.timezone();
        let today = now.date_naive();
        let date = match *self {
            TemporalExpr::RelativeOffset { amount, unit: OffsetUnit::Minutes } => {
                return now.clone().checked_add_signed(TimeDelta::try_minutes(amount)?);
            }
            TemporalExpr::RelativeOffset { amount, unit: OffsetUnit::Hours } => {
                return now.clone().checked_add_signed(TimeDelta::try_hours(amount)?);
            }
            TemporalExpr::RelativeOffset { amount, unit: OffsetUnit::Days } => {
                today.checked_add_signed(TimeDelta::try_days(amount)?)?
            }
            TemporalExpr::RelativeDay(day) => today.checked_add_days(Days::new(day.offset_days()))?,
            TemporalExpr::Weekday { weekday, next } => {
                let mut delta = i64::from(weekday.num_days_from_sunday())
                    - i64::from(now.weekday().num_days_from_sunday());
                if delta <= 0 || next {
                    delta += 7;
                }
                today.checked_add_signed(TimeDelta::days(delta))?
            }
            TemporalExpr::VerbalDate { day, month, year } => {
                let date = calendar_date(year.unwrap_or_else(|| now.year()), month, day)?;
                // Without an explicit year, a day whose midnight is behind us
                // means next year; today's date included.
                if year.is_none() && at_time_of_day(&tz, date, Some(ClockTime::MIDNIGHT))? < *now {
                    same_day_next_year(date)?
                } else {
                    date
                }
            }
        };
        at_time_of_day(&tz, date, clock)
    }
}

fn recognize_relative_day(text: &str) -> Option<TemporalExpr> {
    let found: Vec<Captures<'_>> = RELATIVE_DAY_RE.captures_iter(text).collect();
    let has = |group: &str| found.iter().any(|caps| caps.name(group).is_some());
    let day = if has("today") {
        RelativeDay::Today
    } else if has("tomorrow") {
        RelativeDay::Tomorrow
    } else if has("after") {
        RelativeDay::DayAfterTomorrow
    } else {
        return None;
    };
    Some(TemporalExpr::RelativeDay(day))
}

fn recognize_offset(text: &str) -> Option<TemporalExpr> {
    let found: Vec<(i64, OffsetUnit)> = OFFSET_RE
        .captures_iter(text)
        .map(|caps| {
            let unit = caps[2].to_lowercase();
            let unit = if unit.starts_with("minute") {
                OffsetUnit::Minutes
            } else if unit.starts_with("heure") {
                OffsetUnit::Hours
            } else {
                OffsetUnit::Days
            };
            // Out-of-range amounts still claim the branch; resolution yields None.
            let amount = caps[1].parse().unwrap_or(i64::MAX);
            (amount, unit)
        })
        .collect();
    [OffsetUnit::Minutes, OffsetUnit::Hours, OffsetUnit::Days]
        .into_iter()
        .find_map(|wanted| {
            found
                .iter()
                .find(|(_, unit)| *unit == wanted)
                .map(|&(amount, unit)| TemporalExpr::RelativeOffset { amount, unit })
        })
}

fn recognize_weekday(text: &str) -> Option<TemporalExpr> {
    let caps = WEEKDAY_RE.captures(text)?;
    let weekday = match caps[1].to_lowercase().as_str() {
        "lundi" => Weekday::Mon,
        "mardi" => Weekday::Tue,
        "mercredi" => Weekday::Wed,
        "jeudi" => Weekday::Thu,
        "vendredi" => Weekday::Fri,
        "samedi" => Weekday::Sat,
        "dimanche" => Weekday::Sun,
        _ => return None,
    };
    Some(TemporalExpr::Weekday { weekday, next: caps.get(2).is_some() })
}

fn recognize_verbal_date(text: &str) -> Option<TemporalExpr> {
    let caps = VERBAL_DATE_RE.captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year = match caps.get(3) {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };
    Some(TemporalExpr::VerbalDate { day, month, year })
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "janvier" => 1,
        "février" | "fevrier" => 2,
        "mars" => 3,
        "avril" => 4,
        "mai" => 5,
        "juin" => 6,
        "juillet" => 7,
        "août" | "aout" => 8,
        "septembre" => 9,
        "octobre" => 10,
        "novembre" => 11,
        "décembre" | "decembre" => 12,
        _ => return None,
    };
    Some(month)
}

/// Day numbers past the end of the month roll into the next one, and day 0
/// is the last day of the previous month.
fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_signed(TimeDelta::days(i64::from(day) - 1))
}

/// 29 February rolls to 1 March in a common year.
fn same_day_next_year(date: NaiveDate) -> Option<NaiveDate> {
    let year = date.year().checked_add(1)?;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// Hours and minutes past the end of the day roll into the next day.
fn at_time_of_day<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    clock: Option<ClockTime>,
) -> Option<DateTime<Tz>> {
    let clock = clock.unwrap_or(ClockTime::DEFAULT);
    let minutes = i64::from(clock.hour) * 60 + i64::from(clock.minute);
    let naive = date
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::minutes(minutes))?;
    localize(tz, naive)
}

/// Ambiguous wall-clock times take the earlier instant; times skipped by a
/// DST transition move forward one hour.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest().or_else(|| {
        let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
        tz.from_local_datetime(&shifted).earliest()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn paris() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    /// Wednesday 21 October 2026, 15:42:17.123 (+02:00).
    fn wednesday() -> DateTime<FixedOffset> {
        paris().with_ymd_and_hms(2026, 10, 21, 15, 42, 17).unwrap() + TimeDelta::milliseconds(123)
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        paris().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn resolve(text: &str) -> Option<DateTime<FixedOffset>> {
        resolve_date_time(text, &wednesday())
    }

    #[test]
    fn relative_days_default_to_nine_oclock() {
        assert_eq!(resolve("faire les courses aujourd'hui"), Some(at(2026, 10, 21, 9, 0)));
        assert_eq!(resolve("faire les courses demain"), Some(at(2026, 10, 22, 9, 0)));
        assert_eq!(resolve("faire les courses après-demain"), Some(at(2026, 10, 23, 9, 0)));
        assert_eq!(resolve("faire les courses après demain"), Some(at(2026, 10, 23, 9, 0)));
    }

    #[test]
    fn relative_day_accepts_typographic_apostrophe_and_any_case() {
        assert_eq!(resolve("Aujourd’hui sortir le chien"), Some(at(2026, 10, 21, 9, 0)));
        assert_eq!(resolve("DEMAIN sortir le chien"), Some(at(2026, 10, 22, 9, 0)));
    }

    #[test]
    fn relative_day_order_prefers_today_then_tomorrow() {
        assert_eq!(resolve("demain ou aujourd'hui"), Some(at(2026, 10, 21, 9, 0)));
        assert_eq!(resolve("après-demain ou demain"), Some(at(2026, 10, 22, 9, 0)));
    }

    #[test]
    fn relative_day_beats_weekday() {
        assert_eq!(resolve("vendredi ou aujourd'hui"), Some(at(2026, 10, 21, 9, 0)));
        assert_eq!(resolve("lundi prochain, enfin demain"), Some(at(2026, 10, 22, 9, 0)));
    }

    #[test]
    fn explicit_clock_overrides_time_of_day() {
        assert_eq!(resolve("demain à 14h30"), Some(at(2026, 10, 22, 14, 30)));
        assert_eq!(resolve("demain 8h"), Some(at(2026, 10, 22, 8, 0)));
        assert_eq!(resolve("demain à 9 heures 15"), Some(at(2026, 10, 22, 9, 15)));
        assert_eq!(resolve("demain à 20 heures"), Some(at(2026, 10, 22, 20, 0)));
    }

    #[test]
    fn digit_clock_wins_over_verbal_clock() {
        assert_eq!(
            resolve("demain à 8 heures, non plutôt 10h"),
            Some(at(2026, 10, 22, 10, 0))
        );
    }

    #[test]
    fn clock_past_midnight_rolls_into_next_day() {
        assert_eq!(resolve("demain à 25h"), Some(at(2026, 10, 23, 1, 0)));
    }

    #[test]
    fn minute_offset_is_exact_and_ignores_clock() {
        let now = wednesday();
        let resolved = resolve("appeler maman dans 10 minutes à 18h").unwrap();
        assert_eq!(resolved, now + TimeDelta::minutes(10));
        assert_eq!(resolved.timestamp_millis() - now.timestamp_millis(), 600_000);
    }

    #[test]
    fn hour_offset_is_exact() {
        let now = wednesday();
        assert_eq!(resolve("dans 2 heures"), Some(now + TimeDelta::hours(2)));
        assert_eq!(resolve("dans 1 heure à 9h"), Some(now + TimeDelta::hours(1)));
    }

    #[test]
    fn day_offset_takes_clock_override() {
        let resolved = resolve("dans 3 jours à 14h30").unwrap();
        assert_eq!(resolved, at(2026, 10, 24, 14, 30));
        assert_eq!(resolved.nanosecond(), 0);
        assert_eq!(resolve("dans 3 jours"), Some(at(2026, 10, 24, 9, 0)));
    }

    #[test]
    fn minute_offset_beats_day_offset_wherever_it_appears() {
        let now = wednesday();
        assert_eq!(
            resolve("dans 3 jours ou dans 5 minutes"),
            Some(now + TimeDelta::minutes(5))
        );
    }

    #[test]
    fn overflowing_offset_resolves_to_nothing() {
        assert_eq!(resolve("dans 99999999999999999999 minutes"), None);
        assert_eq!(resolve("dans 9999999999999 jours"), None);
    }

    #[test]
    fn past_weekday_moves_to_next_week() {
        // Wednesday -> Monday is behind us this week.
        assert_eq!(resolve("rendez-vous lundi"), Some(at(2026, 10, 26, 9, 0)));
    }

    #[test]
    fn upcoming_weekday_stays_in_this_week() {
        assert_eq!(resolve("rendez-vous vendredi"), Some(at(2026, 10, 23, 9, 0)));
        assert_eq!(resolve("rendez-vous dimanche"), Some(at(2026, 10, 25, 9, 0)));
    }

    #[test]
    fn same_weekday_and_next_qualifier_add_a_week() {
        assert_eq!(resolve("mercredi"), Some(at(2026, 10, 28, 9, 0)));
        assert_eq!(resolve("vendredi prochain à 11h"), Some(at(2026, 10, 30, 11, 0)));
        assert_eq!(resolve("jeudi suivant"), Some(at(2026, 10, 29, 9, 0)));
    }

    #[test]
    fn verbal_date_in_the_future_keeps_current_year() {
        assert_eq!(resolve("pour le 15 décembre"), Some(at(2026, 12, 15, 9, 0)));
        assert_eq!(resolve("le 2 novembre à 10h"), Some(at(2026, 11, 2, 10, 0)));
    }

    #[test]
    fn verbal_date_in_the_past_rolls_to_next_year() {
        let november = at(2026, 11, 15, 10, 0);
        assert_eq!(resolve_date_time("le 3 janvier", &november), Some(at(2027, 1, 3, 9, 0)));
        let february = at(2026, 2, 10, 10, 0);
        assert_eq!(resolve_date_time("le 3 janvier", &february), Some(at(2027, 1, 3, 9, 0)));
    }

    #[test]
    fn verbal_date_with_explicit_year_never_rolls() {
        assert_eq!(resolve("le 15 mars 2025"), Some(at(2025, 3, 15, 9, 0)));
        assert_eq!(resolve("le 15 mars 2030 à 8h"), Some(at(2030, 3, 15, 8, 0)));
    }

    #[test]
    fn verbal_date_rollover_compares_start_of_day() {
        // Today's date has already begun, so it means next year whatever the hour.
        assert_eq!(resolve("le 21 octobre"), Some(at(2027, 10, 21, 9, 0)));
        assert_eq!(resolve("le 21 octobre à 18h"), Some(at(2027, 10, 21, 18, 0)));
        let early = at(2026, 10, 21, 8, 0);
        assert_eq!(resolve_date_time("le 21 octobre", &early), Some(at(2027, 10, 21, 9, 0)));
        // Tomorrow's midnight is still ahead.
        assert_eq!(resolve("le 22 octobre à 7h"), Some(at(2026, 10, 22, 7, 0)));
    }

    #[test]
    fn verbal_date_overflows_like_calendar_arithmetic() {
        // 31 February 2026 is 3 March, already past in October.
        assert_eq!(resolve("le 31 février"), Some(at(2027, 3, 3, 9, 0)));
        assert_eq!(resolve("le 0 mars 2028"), Some(at(2028, 2, 29, 9, 0)));
    }

    #[test]
    fn leap_day_rollover_lands_on_first_of_march() {
        let summer = at(2028, 6, 1, 12, 0);
        assert_eq!(
            resolve_date_time("le 29 février", &summer),
            Some(at(2029, 3, 1, 9, 0))
        );
    }

    #[test]
    fn time_in_spring_forward_gap_moves_one_hour_later() {
        use chrono::Offset;
        use chrono_tz::Europe::Paris;

        let now = Paris.with_ymd_and_hms(2026, 3, 28, 12, 0, 0).unwrap();
        let resolved = resolve_date_time("demain à 2h30", &now).unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap().and_hms_opt(3, 30, 0).unwrap();
        assert_eq!(resolved.naive_local(), expected);
        assert_eq!(resolved.offset().fix().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn ambiguous_time_at_fall_back_takes_the_earlier_instant() {
        use chrono::Offset;
        use chrono_tz::Europe::Paris;

        let now = Paris.with_ymd_and_hms(2026, 10, 24, 12, 0, 0).unwrap();
        let resolved = resolve_date_time("demain à 2h30", &now).unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap().and_hms_opt(2, 30, 0).unwrap();
        assert_eq!(resolved.naive_local(), expected);
        // Still on summer time: the second 02:30 is an hour later.
        assert_eq!(resolved.offset().fix().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn unaccented_month_names_are_understood() {
        assert_eq!(resolve("le 14 aout 2027"), Some(at(2027, 8, 14, 9, 0)));
        assert_eq!(resolve("le 1 decembre"), Some(at(2026, 12, 1, 9, 0)));
    }

    #[test]
    fn weekday_beats_verbal_date() {
        assert_eq!(resolve("vendredi le 15 décembre"), Some(at(2026, 10, 23, 9, 0)));
    }

    #[test]
    fn nothing_recognized_yields_none() {
        assert_eq!(resolve("acheter du pain"), None);
        assert_eq!(resolve("dans beaucoup de temps"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn recognize_reports_expression_family() {
        assert_eq!(
            recognize("après-demain"),
            Some(TemporalExpr::RelativeDay(RelativeDay::DayAfterTomorrow))
        );
        assert_eq!(
            recognize("dans 4 heures"),
            Some(TemporalExpr::RelativeOffset { amount: 4, unit: OffsetUnit::Hours })
        );
        assert_eq!(
            recognize("samedi prochain"),
            Some(TemporalExpr::Weekday { weekday: Weekday::Sat, next: true })
        );
        assert_eq!(
            recognize("pour le 3 mai 2027"),
            Some(TemporalExpr::VerbalDate { day: 3, month: 5, year: Some(2027) })
        );
        assert_eq!(recognize("rien du tout"), None);
    }

    #[test]
    fn find_clock_time_reads_both_forms() {
        assert_eq!(find_clock_time("à 7h05"), Some(ClockTime { hour: 7, minute: 5 }));
        assert_eq!(find_clock_time("à 7 heures"), Some(ClockTime { hour: 7, minute: 0 }));
        assert_eq!(find_clock_time("voilà 3 heures"), None);
        assert_eq!(find_clock_time("sans heure"), None);
    }

    #[test]
    fn clause_starts_covers_every_family() {
        let text = "payer demain";
        assert_eq!(clause_starts(text), vec![6]);
        let text = "rdv à 14h30 vendredi";
        assert_eq!(clause_starts(text), vec![4, 13]);
        let text = "appeler pour le 3 mai";
        assert_eq!(clause_starts(text), vec![8]);
        assert!(clause_starts("acheter du pain").is_empty());
    }

    #[test]
    fn repeated_calls_do_not_share_match_state() {
        for _ in 0..3 {
            assert_eq!(resolve("demain"), Some(at(2026, 10, 22, 9, 0)));
        }
    }
}
