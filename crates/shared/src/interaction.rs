use crate::geo::Dataset;
use crate::models::{PointOfInterest, RegionId, RegionVisual};

/// Zoom level at and above which markers of the selected region are shown.
pub const MARKER_VISIBLE_ZOOM: f64 = 2.2;

/// Status text while nothing is selected.
pub const DEFAULT_PROMPT: &str = "Click a state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionFill {
    Idle,
    Hover,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected(RegionId),
    Deselected(RegionId),
    /// The id does not belong to the loaded dataset.
    Ignored,
}

/// Hover and selection state for one mounted map.
///
/// Region visuals are a side table indexed by [`RegionId`]. At most one entry
/// is selected at any time, and `selected` always names that entry.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionCoordinator {
    visuals: Vec<RegionVisual>,
    hovered: Option<RegionId>,
    selected: Option<RegionId>,
    hovered_marker: Option<usize>,
    status: String,
}

impl Default for InteractionCoordinator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl InteractionCoordinator {
    pub fn new(region_count: usize) -> Self {
        Self {
            visuals: vec![RegionVisual::default(); region_count],
            hovered: None,
            selected: None,
            hovered_marker: None,
            status: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self::new(dataset.len())
    }

    pub fn visual(&self, id: RegionId) -> Option<&RegionVisual> {
        self.visuals.get(id.0)
    }

    pub fn selected(&self) -> Option<RegionId> {
        self.selected
    }

    pub fn selected_name<'a>(&self, dataset: &'a Dataset) -> Option<&'a str> {
        self.selected.and_then(|id| dataset.name_of(id))
    }

    pub fn hovered(&self) -> Option<RegionId> {
        self.hovered
    }

    pub fn hovered_marker(&self) -> Option<usize> {
        self.hovered_marker
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    // --- regions ---

    /// Move the hover to `id` (or off every region with `None`). Returns
    /// `true` when the hovered region changed.
    pub fn set_hover(&mut self, id: Option<RegionId>) -> bool {
        let id = id.filter(|id| id.0 < self.visuals.len());
        if self.hovered == id {
            return false;
        }
        self.hovered = id;
        true
    }

    pub fn pointer_enter(&mut self, id: RegionId) -> bool {
        self.set_hover(Some(id))
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.set_hover(None)
    }

    /// Toggle selection of `id`, first clearing any other selected region.
    pub fn tap(&mut self, id: RegionId, dataset: &Dataset) -> SelectionChange {
        if id.0 >= self.visuals.len() {
            return SelectionChange::Ignored;
        }
        if let Some(previous) = self.selected.filter(|prev| *prev != id) {
            self.visuals[previous.0].is_selected = false;
        }

        let visual = &mut self.visuals[id.0];
        visual.is_selected = !visual.is_selected;

        if visual.is_selected {
            self.selected = Some(id);
            let name = dataset.name_of(id).unwrap_or(crate::models::UNKNOWN_REGION);
            self.status = format!("Selected: {name}");
            tracing::debug!(region = name, "region selected");
            SelectionChange::Selected(id)
        } else {
            self.selected = None;
            self.status = DEFAULT_PROMPT.to_string();
            SelectionChange::Deselected(id)
        }
    }

    /// Fill state of a region. A selected region ignores hover.
    pub fn fill_for(&self, id: RegionId) -> RegionFill {
        match self.visual(id) {
            Some(v) if v.is_selected => RegionFill::Selected,
            _ if self.hovered == Some(id) => RegionFill::Hover,
            _ => RegionFill::Idle,
        }
    }

    // --- markers ---

    pub fn marker_enter(&mut self, index: usize) -> bool {
        if self.hovered_marker == Some(index) {
            return false;
        }
        self.hovered_marker = Some(index);
        true
    }

    pub fn marker_leave(&mut self) -> bool {
        self.hovered_marker.take().is_some()
    }

    /// Tapping a marker only updates the status text; region selection stays.
    pub fn marker_tap(&mut self, point: &PointOfInterest) {
        self.status = format!("Selected: {}", point.name);
    }

    /// Visible iff zoomed in to [`MARKER_VISIBLE_ZOOM`] and the point belongs
    /// to the selected region.
    pub fn marker_visible(&self, point: &PointOfInterest, zoom: f64, dataset: &Dataset) -> bool {
        zoom >= MARKER_VISIBLE_ZOOM
            && self
                .selected_name(dataset)
                .is_some_and(|name| name == point.region)
    }

    /// Indices of the points that are visible right now.
    pub fn visible_markers(
        &self,
        points: &[PointOfInterest],
        zoom: f64,
        dataset: &Dataset,
    ) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.marker_visible(p, zoom, dataset))
            .map(|(i, _)| i)
            .collect()
    }
}
