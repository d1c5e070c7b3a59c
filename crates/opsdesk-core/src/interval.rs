//! Half-open time intervals and the overlap predicate every conflict policy
//! reduces to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// `true` when `[a_start, a_end)` and `[b_start, b_end)` share an instant.
///
/// Ranges that merely touch (one ends exactly where the other starts) do not
/// overlap.
pub fn overlaps(
  a_start: DateTime<Utc>,
  a_end: DateTime<Utc>,
  b_start: DateTime<Utc>,
  b_end: DateTime<Utc>,
) -> bool {
  a_start < b_end && b_start < a_end
}

/// A validated `[start, end)` range with `end` strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
  start: DateTime<Utc>,
  end:   DateTime<Utc>,
}

impl Interval {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
    if end <= start {
      return Err(Error::validation(format!(
        "end ({end}) must be after start ({start})"
      )));
    }
    Ok(Self { start, end })
  }

  pub fn start(&self) -> DateTime<Utc> { self.start }

  pub fn end(&self) -> DateTime<Utc> { self.end }

  pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    overlaps(self.start, self.end, start, end)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()
      + Duration::minutes(minutes)
  }

  #[test]
  fn touching_ranges_do_not_overlap() {
    assert!(!overlaps(at(0), at(10), at(10), at(20)));
    assert!(!overlaps(at(10), at(20), at(0), at(10)));
  }

  #[test]
  fn overlap_is_symmetric() {
    let cases = [
      (0, 10, 5, 15),
      (0, 10, 10, 20),
      (0, 30, 10, 20),
      (0, 5, 6, 9),
      (3, 4, 0, 60),
    ];
    for (a0, a1, b0, b1) in cases {
      assert_eq!(
        overlaps(at(a0), at(a1), at(b0), at(b1)),
        overlaps(at(b0), at(b1), at(a0), at(a1)),
        "asymmetric for [{a0},{a1}) vs [{b0},{b1})"
      );
    }
  }

  #[test]
  fn containment_counts_as_overlap() {
    assert!(overlaps(at(0), at(60), at(15), at(30)));
    assert!(overlaps(at(15), at(30), at(0), at(60)));
  }

  #[test]
  fn identical_ranges_overlap() {
    assert!(overlaps(at(0), at(10), at(0), at(10)));
  }

  #[test]
  fn interval_rejects_empty_and_inverted() {
    assert!(matches!(
      Interval::new(at(10), at(10)),
      Err(Error::Validation(_))
    ));
    assert!(matches!(
      Interval::new(at(10), at(5)),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn interval_overlap_delegates_to_predicate() {
    let i = Interval::new(at(60), at(120)).unwrap();
    assert!(i.overlaps(at(90), at(150)));
    assert!(!i.overlaps(at(120), at(180)));
    assert!(!i.overlaps(at(0), at(60)));
  }
}
