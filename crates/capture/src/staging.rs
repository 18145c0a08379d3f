//! The off-screen host a clone is mounted into while it is captured.

use folio_style::StyledNode;
use folio_types::PaperSize;
use log::debug;

/// Distance the host is pushed off the left edge, in source pixels.
pub const STAGING_OFFSET_LEFT_PX: f32 = -10_000.0;

/// Extra height above the tallest paper so no forced height is ever clipped.
const STAGING_HEADROOM_PX: f32 = 100.0;

/// Off-screen container for the clone being captured.
///
/// Mounting needs `&mut self` and the returned guard keeps that borrow, so one
/// staging area can never host two captures at once.
#[derive(Debug)]
pub struct StagingArea {
    host: StyledNode,
    occupied: bool,
    mounts: usize,
}

impl Default for StagingArea {
    fn default() -> Self {
        Self::new()
    }
}

impl StagingArea {
    pub fn new() -> Self {
        let height = PaperSize::tallest().profile().height_px_floor() + STAGING_HEADROOM_PX;
        let host = StyledNode::element("div")
            .with_attribute("aria-hidden", "true")
            .with_style("position", "fixed")
            .with_style("left", format!("{}px", STAGING_OFFSET_LEFT_PX))
            .with_style("top", "0px")
            .with_style("height", format!("{}px", height))
            .with_style("overflow", "visible")
            .with_style("pointer-events", "none");
        Self {
            host,
            occupied: false,
            mounts: 0,
        }
    }

    /// The host element's own styling.
    pub fn host(&self) -> &StyledNode {
        &self.host
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Total number of mounts over the lifetime of this area.
    pub fn mount_count(&self) -> usize {
        self.mounts
    }

    pub fn mount(&mut self, node: StyledNode) -> MountGuard<'_> {
        self.occupied = true;
        self.mounts += 1;
        debug!("Mounted <{}> in staging area", node.tag);
        MountGuard { area: self, node }
    }
}

/// A clone mounted in a [`StagingArea`]. Dropping it unmounts the clone.
#[derive(Debug)]
pub struct MountGuard<'a> {
    area: &'a mut StagingArea,
    node: StyledNode,
}

impl MountGuard<'_> {
    pub fn node(&self) -> &StyledNode {
        &self.node
    }

}

impl Drop for MountGuard<'_> {
    fn drop(&mut self) {
        self.area.occupied = false;
        debug!("Unmounted <{}> from staging area", self.node.tag);
    }
}
