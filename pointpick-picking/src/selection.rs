//! Highlighting of the picked point
//!
//! Every pick outcome rewrites the whole color buffer: all points go back to
//! the default color and the hit point, if any, is painted with the
//! highlight color. At most one point is highlighted at any time.

use pointpick_core::{PointDataset, Result, Rgb};

use crate::picking::PickResult;

/// What is currently highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Highlighted(usize),
}

impl SelectionState {
    pub fn highlighted(&self) -> Option<usize> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Highlighted(index) => Some(*index),
        }
    }
}

/// Colors used for unselected and selected points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionColors {
    pub default_color: Rgb,
    pub highlight: Rgb,
}

impl Default for SelectionColors {
    fn default() -> Self {
        Self {
            default_color: Rgb::WHITE,
            highlight: Rgb::RED,
        }
    }
}

/// Applies pick outcomes to a dataset's color buffer
#[derive(Debug, Clone, Default)]
pub struct SelectionStateMachine {
    state: SelectionState,
    colors: SelectionColors,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(colors: SelectionColors) -> Self {
        Self {
            state: SelectionState::Idle,
            colors,
        }
    }

    pub fn current(&self) -> SelectionState {
        self.state
    }

    pub fn colors(&self) -> SelectionColors {
        self.colors
    }

    /// Recolor `dataset` for a pick outcome; a miss clears the highlight.
    ///
    /// The buffer is flagged dirty either way. A hit whose index lies outside
    /// the dataset leaves every point in the default color and fails with
    /// [`pointpick_core::Error::IndexOutOfRange`].
    pub fn apply(
        &mut self,
        dataset: &mut PointDataset,
        pick: Option<&PickResult>,
    ) -> Result<SelectionState> {
        dataset.reset_colors(self.colors.default_color);
        dataset.mark_colors_dirty();
        self.state = SelectionState::Idle;

        if let Some(pick) = pick {
            if let Err(err) = dataset.set_color(pick.point_index, self.colors.highlight) {
                log::error!("pick index {} outside dataset: {}", pick.point_index, err);
                debug_assert!(false, "pick index outside dataset");
                return Err(err);
            }
            self.state = SelectionState::Highlighted(pick.point_index);
        }

        log::debug!("selection is now {:?}", self.state);
        Ok(self.state)
    }

    /// Drop the highlight and restore the default colors
    pub fn clear(&mut self, dataset: &mut PointDataset) {
        dataset.reset_colors(self.colors.default_color);
        dataset.mark_colors_dirty();
        self.state = SelectionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointpick_core::{Point3f, Ray, Vector3f};

    fn cloud() -> PointDataset {
        PointDataset::from_points(&[
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
        ])
    }

    fn hit(index: usize) -> PickResult {
        PickResult {
            point_index: index,
            distance: 10.0,
            point: Point3f::origin(),
            world_ray: Ray::new(Point3f::new(0.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, -1.0)),
        }
    }

    #[test]
    fn test_highlight_single_point() {
        let mut dataset = cloud();
        let mut selection = SelectionStateMachine::new();

        let state = selection.apply(&mut dataset, Some(&hit(1))).unwrap();
        assert_eq!(state, SelectionState::Highlighted(1));
        assert_eq!(
            dataset.color_buffer(),
            &[1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]
        );
        assert!(dataset.is_colors_dirty());
    }

    #[test]
    fn test_new_hit_moves_highlight() {
        let mut dataset = cloud();
        let mut selection = SelectionStateMachine::new();

        selection.apply(&mut dataset, Some(&hit(2))).unwrap();
        selection.apply(&mut dataset, Some(&hit(0))).unwrap();

        assert_eq!(selection.current().highlighted(), Some(0));
        assert_eq!(dataset.color(0), Some(Rgb::RED));
        assert_eq!(dataset.color(2), Some(Rgb::WHITE));
    }

    #[test]
    fn test_miss_clears() {
        let mut dataset = cloud();
        let mut selection = SelectionStateMachine::new();

        selection.apply(&mut dataset, Some(&hit(0))).unwrap();
        dataset.take_colors_dirty();

        let state = selection.apply(&mut dataset, None).unwrap();
        assert_eq!(state, SelectionState::Idle);
        assert!(dataset.color_buffer().iter().all(|&c| c == 1.0));
        assert!(dataset.is_colors_dirty());
    }

    #[test]
    fn test_custom_colors() {
        let mut dataset = cloud();
        let mut selection = SelectionStateMachine::with_colors(SelectionColors {
            default_color: Rgb::BLACK,
            highlight: Rgb::YELLOW,
        });

        selection.apply(&mut dataset, Some(&hit(2))).unwrap();
        assert_eq!(dataset.color(0), Some(Rgb::BLACK));
        assert_eq!(dataset.color(2), Some(Rgb::YELLOW));

        selection.clear(&mut dataset);
        assert_eq!(selection.current(), SelectionState::Idle);
        assert_eq!(dataset.color(2), Some(Rgb::BLACK));
    }
}
