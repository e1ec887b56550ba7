//! # Page Break Decisions
//!
//! Before each block the layout engine asks whether the block still fits
//! and whether a divider rule should separate it from what came before.
//! The rules live here as a pure function so they can be tested without a
//! canvas.

/// What to do before placing a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpaceDecision {
    /// Not enough room: start a new page, no divider.
    NewPage,
    /// Room is fine and a divider was asked for: draw it.
    Divider,
    /// Room is fine; place the block where the cursor is.
    Proceed,
}

/// Inputs for [`decide_space`], all in page coordinates.
#[derive(Debug, Clone, Copy)]
pub struct SpaceQuery {
    /// Current cursor y.
    pub y: f64,
    /// Top of the page body.
    pub body_top: f64,
    /// Lowest y flowing content may reach.
    pub bottom_limit: f64,
    /// Height the upcoming block needs.
    pub needed: f64,
    pub wants_divider: bool,
    /// Within this distance of `body_top` the cursor counts as at the top.
    pub top_tolerance: f64,
    /// A divider needs at least this much room below it.
    pub divider_min_room: f64,
}

/// Decide whether a block fits, and whether to separate it with a divider.
///
/// A divider is never the first thing on a page and never the last: it is
/// suppressed when the cursor sits at the top of the body, and when less
/// than `divider_min_room` remains below it.
pub fn decide_space(query: SpaceQuery) -> SpaceDecision {
    if query.y + query.needed > query.bottom_limit {
        return SpaceDecision::NewPage;
    }

    if !query.wants_divider {
        return SpaceDecision::Proceed;
    }

    let at_top = (query.y - query.body_top).abs() < query.top_tolerance;
    let enough_below = query.bottom_limit - query.y > query.divider_min_room;

    if !at_top && enough_below {
        SpaceDecision::Divider
    } else {
        SpaceDecision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(y: f64, needed: f64, wants_divider: bool) -> SpaceQuery {
        SpaceQuery {
            y,
            body_top: 40.0,
            bottom_limit: 782.0,
            needed,
            wants_divider,
            top_tolerance: 2.0,
            divider_min_room: 24.0,
        }
    }

    #[test]
    fn fits_without_divider() {
        assert_eq!(decide_space(query(300.0, 28.0, false)), SpaceDecision::Proceed);
    }

    #[test]
    fn fits_with_divider() {
        assert_eq!(decide_space(query(300.0, 28.0, true)), SpaceDecision::Divider);
    }

    #[test]
    fn insufficient_room_breaks() {
        // 100pt of room, block needs 120
        assert_eq!(decide_space(query(682.0, 120.0, true)), SpaceDecision::NewPage);
    }

    #[test]
    fn exact_fit_does_not_break() {
        assert_eq!(decide_space(query(662.0, 120.0, false)), SpaceDecision::Proceed);
    }

    #[test]
    fn no_divider_at_top_of_page() {
        assert_eq!(decide_space(query(40.0, 28.0, true)), SpaceDecision::Proceed);
        assert_eq!(decide_space(query(41.5, 28.0, true)), SpaceDecision::Proceed);
        assert_eq!(decide_space(query(42.5, 28.0, true)), SpaceDecision::Divider);
    }

    #[test]
    fn no_divider_without_room_below() {
        // 20pt left, block needs 10: fits, but a divider would be orphaned
        assert_eq!(decide_space(query(762.0, 10.0, true)), SpaceDecision::Proceed);
    }
}
