use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::search::FlightQuery;
use crate::{CoreError, CoreResult};

pub const MIN_SEGMENTS: usize = 2;
pub const MAX_SEGMENTS: usize = 6;

/// One leg of a multi-city trip as the traveller typed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItinerarySegment {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub date: Option<NaiveDate>,
}

impl ItinerarySegment {
    fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            from: String::new(),
            to: String::new(),
            date: None,
        }
    }

    fn is_complete(&self) -> bool {
        !self.from.trim().is_empty() && !self.to.trim().is_empty() && self.date.is_some()
    }
}

/// Leg `leg` lands somewhere other than where leg `leg + 1` departs.
/// Searchable, but the legs end up as separate bookings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGap {
    /// 1-based, as shown to the traveller
    pub leg: usize,
    pub arrives: String,
    pub departs: String,
}

impl std::fmt::Display for RouteGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Flight {} destination ({}) doesn't match Flight {} origin ({}). This may result in separate bookings.",
            self.leg,
            self.arrives,
            self.leg + 1,
            self.departs
        )
    }
}

/// Ordered multi-city segments. Always holds between `MIN_SEGMENTS` and
/// `MAX_SEGMENTS` entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Itinerary {
    segments: Vec<ItinerarySegment>,
}

impl Default for Itinerary {
    fn default() -> Self {
        Self::new()
    }
}

impl Itinerary {
    pub fn new() -> Self {
        Self {
            segments: (0..MIN_SEGMENTS).map(|_| ItinerarySegment::blank()).collect(),
        }
    }

    pub fn segments(&self) -> &[ItinerarySegment] {
        &self.segments
    }

    /// Append a blank segment and return its id.
    pub fn add_segment(&mut self) -> CoreResult<Uuid> {
        if self.segments.len() >= MAX_SEGMENTS {
            return Err(self.limit());
        }
        let segment = ItinerarySegment::blank();
        let id = segment.id;
        self.segments.push(segment);
        Ok(id)
    }

    pub fn remove_segment(&mut self, id: Uuid) -> CoreResult<()> {
        let index = self.position(id)?;
        if self.segments.len() <= MIN_SEGMENTS {
            return Err(self.limit());
        }
        self.segments.remove(index);
        Ok(())
    }

    pub fn update_segment(
        &mut self,
        id: Uuid,
        from: impl Into<String>,
        to: impl Into<String>,
        date: Option<NaiveDate>,
    ) -> CoreResult<()> {
        let index = self.position(id)?;
        let segment = &mut self.segments[index];
        segment.from = from.into();
        segment.to = to.into();
        segment.date = date;
        Ok(())
    }

    /// Every segment must be filled in and dates must not go backwards.
    /// Route breaks are returned as warnings rather than rejected.
    pub fn validate(&self) -> CoreResult<Vec<RouteGap>> {
        if let Some(i) = self.segments.iter().position(|s| !s.is_complete()) {
            return Err(CoreError::IncompleteSegment(i + 1));
        }

        let mut gaps = Vec::new();
        for (i, pair) in self.segments.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            if !current.to.trim().eq_ignore_ascii_case(next.from.trim()) {
                gaps.push(RouteGap {
                    leg: i + 1,
                    arrives: current.to.trim().to_string(),
                    departs: next.from.trim().to_string(),
                });
            }
            if current.date > next.date {
                return Err(CoreError::SegmentOutOfOrder { earlier: i + 1, later: i + 2 });
            }
        }
        Ok(gaps)
    }

    /// One search query per segment, in order. Fails like `validate`.
    pub fn queries(&self) -> CoreResult<Vec<FlightQuery>> {
        self.validate()?;
        Ok(self
            .segments
            .iter()
            .filter_map(|s| s.date.map(|date| FlightQuery::search(s.from.trim(), s.to.trim(), date)))
            .collect())
    }

    fn position(&self, id: Uuid) -> CoreResult<usize> {
        self.segments
            .iter()
            .position(|s| s.id == id)
            .ok_or(CoreError::UnknownSegment(id))
    }

    fn limit(&self) -> CoreError {
        CoreError::SegmentLimit { min: MIN_SEGMENTS, max: MAX_SEGMENTS }
    }
}
