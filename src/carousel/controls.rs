//! Carousel chrome - which controls to render and the progress fraction.

bitflags::bitflags! {
    /// Controls a carousel should render.
    ///
    /// Combine with bitwise OR: `CarouselControls::ARROWS | CarouselControls::DOTS`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CarouselControls: u8 {
        const NONE = 0;
        /// Previous/next buttons
        const ARROWS = 1 << 0;
        /// One indicator per item
        const DOTS = 1 << 1;
        /// Autoplay progress bar
        const PROGRESS = 1 << 2;
    }
}

impl CarouselControls {
    /// Controls for a carousel of `len` items. Nothing renders below two items.
    pub fn for_carousel(len: usize, show_arrows: bool, show_dots: bool, autoplay: bool) -> Self {
        if len <= 1 {
            return Self::NONE;
        }
        let mut controls = Self::NONE;
        controls.set(Self::ARROWS, show_arrows);
        controls.set(Self::DOTS, show_dots);
        controls.set(Self::PROGRESS, autoplay);
        controls
    }
}

/// Fraction of the sequence reached at `active` (1-based), 0.0 when empty.
pub fn progress_fraction(active: usize, len: usize) -> f32 {
    if len == 0 {
        return 0.0;
    }
    ((active + 1) as f32 / len as f32).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_item_has_no_controls() {
        assert_eq!(CarouselControls::for_carousel(1, true, true, true), CarouselControls::NONE);
        assert_eq!(CarouselControls::for_carousel(0, true, true, true), CarouselControls::NONE);
    }

    #[test]
    fn test_flags_follow_options() {
        let controls = CarouselControls::for_carousel(3, true, false, true);
        assert!(controls.contains(CarouselControls::ARROWS));
        assert!(!controls.contains(CarouselControls::DOTS));
        assert!(controls.contains(CarouselControls::PROGRESS));
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(0, 4), 0.25);
        assert_eq!(progress_fraction(3, 4), 1.0);
        assert_eq!(progress_fraction(0, 0), 0.0);
    }
}
