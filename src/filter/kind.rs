/// The filter catalog
///
/// Every filter the app offers is listed here, together with the scalar
/// parameters it understands. The set of accepted parameters is a static
/// table so a typo in a parameter name is a compile error, not a silently
/// ignored key at runtime.

/// The seven filters offered by the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Crystallize,
    Edges,
    GaussianBlur,
    Pixellate,
    SepiaTone,
    UnsharpMask,
    Vignette,
}

/// Scalar parameters a filter can accept
///
/// A filter accepts zero or more of these simultaneously (UnsharpMask and
/// Vignette take two). There is no priority between them: every accepted
/// key is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey {
    Intensity,
    Radius,
    Scale,
}

impl FilterKind {
    /// All filters, in the order they appear in the palette
    pub const ALL: [FilterKind; 7] = [
        FilterKind::Crystallize,
        FilterKind::Edges,
        FilterKind::GaussianBlur,
        FilterKind::Pixellate,
        FilterKind::SepiaTone,
        FilterKind::UnsharpMask,
        FilterKind::Vignette,
    ];

    /// Human-readable name for the palette and share filenames
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Crystallize => "Crystallize",
            FilterKind::Edges => "Edges",
            FilterKind::GaussianBlur => "Gaussian Blur",
            FilterKind::Pixellate => "Pixellate",
            FilterKind::SepiaTone => "Sepia Tone",
            FilterKind::UnsharpMask => "Unsharp Mask",
            FilterKind::Vignette => "Vignette",
        }
    }

    /// The parameters this filter accepts
    pub fn params(&self) -> &'static [ParamKey] {
        match self {
            FilterKind::Crystallize => &[ParamKey::Radius],
            FilterKind::Edges => &[ParamKey::Intensity],
            FilterKind::GaussianBlur => &[ParamKey::Radius],
            FilterKind::Pixellate => &[ParamKey::Scale],
            FilterKind::SepiaTone => &[ParamKey::Intensity],
            FilterKind::UnsharpMask => &[ParamKey::Radius, ParamKey::Intensity],
            FilterKind::Vignette => &[ParamKey::Intensity, ParamKey::Radius],
        }
    }

    pub fn accepts(&self, key: ParamKey) -> bool {
        self.params().contains(&key)
    }
}

impl Default for FilterKind {
    /// The filter active when the app starts
    fn default() -> Self {
        FilterKind::SepiaTone
    }
}

/// Parameter values handed to the rendering engine
///
/// A field is `Some` exactly when the filter accepts that key.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterParams {
    pub intensity: Option<f32>,
    pub radius: Option<f32>,
    pub scale: Option<f32>,
}

impl FilterParams {
    /// Map the slider value onto the parameters `kind` accepts
    ///
    /// The slider value is in [0, 1] and each parameter family has a fixed
    /// linear scale:
    /// - intensity = v
    /// - radius = v * 200
    /// - scale = v * 10
    pub fn map(kind: FilterKind, intensity: f32) -> Self {
        let mut params = FilterParams::default();

        if kind.accepts(ParamKey::Intensity) {
            params.intensity = Some(intensity);
        }
        if kind.accepts(ParamKey::Radius) {
            params.radius = Some(intensity * 200.0);
        }
        if kind.accepts(ParamKey::Scale) {
            params.scale = Some(intensity * 10.0);
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_sepia() {
        assert_eq!(FilterKind::default(), FilterKind::SepiaTone);
    }

    #[test]
    fn test_intensity_maps_identically() {
        let params = FilterParams::map(FilterKind::SepiaTone, 0.5);
        assert_eq!(params.intensity, Some(0.5));
        assert_eq!(params.radius, None);
        assert_eq!(params.scale, None);
    }

    #[test]
    fn test_radius_scale_factor() {
        let params = FilterParams::map(FilterKind::GaussianBlur, 0.25);
        assert_eq!(params.radius, Some(50.0));
        assert_eq!(params.intensity, None);
        assert_eq!(params.scale, None);
    }

    #[test]
    fn test_scale_scale_factor() {
        let params = FilterParams::map(FilterKind::Pixellate, 0.7);
        assert_eq!(params.scale, Some(7.0));
        assert_eq!(params.intensity, None);
        assert_eq!(params.radius, None);
    }

    #[test]
    fn test_unsharp_mask_sets_both_accepted_params() {
        // UnsharpMask takes radius and intensity at the same time
        let params = FilterParams::map(FilterKind::UnsharpMask, 0.8);
        assert_eq!(params.radius, Some(160.0));
        assert_eq!(params.intensity, Some(0.8));
        assert_eq!(params.scale, None);
    }

    #[test]
    fn test_vignette_sets_both_accepted_params() {
        let params = FilterParams::map(FilterKind::Vignette, 0.5);
        assert_eq!(params.intensity, Some(0.5));
        assert_eq!(params.radius, Some(100.0));
        assert_eq!(params.scale, None);
    }

    #[test]
    fn test_every_filter_sets_exactly_its_accepted_keys() {
        for kind in FilterKind::ALL {
            let params = FilterParams::map(kind, 0.5);
            assert_eq!(params.intensity.is_some(), kind.accepts(ParamKey::Intensity));
            assert_eq!(params.radius.is_some(), kind.accepts(ParamKey::Radius));
            assert_eq!(params.scale.is_some(), kind.accepts(ParamKey::Scale));
        }
    }

    #[test]
    fn test_labels_are_unique() {
        for a in FilterKind::ALL {
            for b in FilterKind::ALL {
                if a != b {
                    assert_ne!(a.label(), b.label());
                }
            }
        }
    }
}
