use serde::Serialize;

/// A pre-rendered thumbnail variant the client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbType {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    /// Cropped to the exact size instead of fitting inside it.
    pub crop: bool,
}

const fn tile(name: &'static str, size: u32) -> ThumbType {
    ThumbType {
        name,
        width: size,
        height: size,
        crop: true,
    }
}

const fn fit(name: &'static str, width: u32, height: u32) -> ThumbType {
    ThumbType {
        name,
        width,
        height,
        crop: false,
    }
}

pub const THUMB_TYPES: &[ThumbType] = &[
    tile("tile_50", 50),
    tile("tile_100", 100),
    tile("tile_224", 224),
    tile("tile_500", 500),
    fit("fit_720", 720, 720),
    fit("fit_1280", 1280, 1024),
    fit("fit_1920", 1920, 1200),
    fit("fit_2048", 2048, 2048),
    fit("fit_2560", 2560, 1600),
    fit("fit_3840", 3840, 2400),
    fit("fit_7680", 7680, 4320),
];

/// Thumbnail types that fit within `max_size` pixels.
pub fn available(max_size: u32) -> Vec<ThumbType> {
    THUMB_TYPES
        .iter()
        .filter(|thumb| thumb.width <= max_size && thumb.height <= max_size)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_limit_filters_large_fits() {
        let names: Vec<_> =
            available(2048).iter().map(|thumb| thumb.name).collect();
        assert!(names.contains(&"tile_500"));
        assert!(names.contains(&"fit_2048"));
        assert!(!names.contains(&"fit_2560"));
    }

    #[test]
    fn maximum_size_keeps_everything() {
        assert_eq!(available(7680).len(), THUMB_TYPES.len());
    }
}
