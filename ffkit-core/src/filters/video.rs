// ffkit-core/src/filters/video.rs
//
// Concrete ffmpeg video filters.

use super::VideoFilter;

/// Renders nothing. Used where a filter slot must be filled but no filtering
/// is wanted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyFilter;

impl VideoFilter for EmptyFilter {
    fn render(&self) -> String {
        String::new()
    }
}

/// Arbitrary filter expression passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFilter(String);

impl RawFilter {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }
}

impl VideoFilter for RawFilter {
    fn render(&self) -> String {
        self.0.clone()
    }
}

/// Interlace detection filter. Its per-frame statistics are what
/// [`crate::processing::interlace`] parses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdetFilter;

impl VideoFilter for IdetFilter {
    fn render(&self) -> String {
        "idet".to_string()
    }
}

/// yadif deinterlacer.
///
/// `parity` follows ffmpeg: 0 = top field first, 1 = bottom field first,
/// -1 = let the decoder decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YadifFilter {
    pub mode: u8,
    pub parity: i8,
    pub deint: u8,
}

impl YadifFilter {
    pub const DEFAULT_MODE: u8 = 0;
    pub const DEFAULT_PARITY: i8 = -1;
    pub const DEFAULT_DEINT: u8 = 0;

    pub const PARITY_TFF: i8 = 0;
    pub const PARITY_BFF: i8 = 1;

    #[must_use]
    pub fn with_parity(parity: i8) -> Self {
        Self {
            parity,
            ..Self::default()
        }
    }
}

impl Default for YadifFilter {
    fn default() -> Self {
        Self {
            mode: Self::DEFAULT_MODE,
            parity: Self::DEFAULT_PARITY,
            deint: Self::DEFAULT_DEINT,
        }
    }
}

impl VideoFilter for YadifFilter {
    fn render(&self) -> String {
        format!(
            "yadif=mode={}:parity={}:deint={}",
            self.mode, self.parity, self.deint
        )
    }
}

/// High quality 3D denoiser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hqdn3dFilter {
    pub luma_spatial: f64,
    pub chroma_spatial: f64,
    pub luma_tmp: f64,
    pub chroma_tmp: f64,
}

impl Default for Hqdn3dFilter {
    fn default() -> Self {
        Self {
            luma_spatial: 4.0,
            chroma_spatial: 3.0,
            luma_tmp: 6.0,
            chroma_tmp: 4.5,
        }
    }
}

impl VideoFilter for Hqdn3dFilter {
    fn render(&self) -> String {
        format!(
            "hqdn3d={}:{}:{}:{}",
            self.luma_spatial, self.chroma_spatial, self.luma_tmp, self.chroma_tmp
        )
    }
}

/// Non-local means denoiser. Much slower than hqdn3d.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NlmeansFilter {
    /// Denoising strength
    pub strength: f64,
    /// Patch size
    pub patch_size: u32,
    /// Research window size
    pub research_size: u32,
}

impl Default for NlmeansFilter {
    fn default() -> Self {
        Self {
            strength: 1.0,
            patch_size: 7,
            research_size: 15,
        }
    }
}

impl VideoFilter for NlmeansFilter {
    fn render(&self) -> String {
        format!(
            "nlmeans=s={}:p={}:r={}",
            self.strength, self.patch_size, self.research_size
        )
    }
}

/// Scale to a fixed size. A dimension of -1 or -2 keeps the aspect ratio
/// (-2 also rounds to an even value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFilter {
    pub width: i32,
    pub height: i32,
}

impl ScaleFilter {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl VideoFilter for ScaleFilter {
    fn render(&self) -> String {
        format!("scale=w={}:h={}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yadif_render() {
        assert_eq!(
            YadifFilter::default().render(),
            "yadif=mode=0:parity=-1:deint=0"
        );
        assert_eq!(
            YadifFilter::with_parity(YadifFilter::PARITY_BFF).render(),
            "yadif=mode=0:parity=1:deint=0"
        );
    }

    #[test]
    fn test_denoise_render() {
        assert_eq!(Hqdn3dFilter::default().render(), "hqdn3d=4:3:6:4.5");
        let strong = Hqdn3dFilter {
            luma_spatial: 8.0,
            ..Hqdn3dFilter::default()
        };
        assert_eq!(strong.render(), "hqdn3d=8:3:6:4.5");
        assert_eq!(NlmeansFilter::default().render(), "nlmeans=s=1:p=7:r=15");
    }

    #[test]
    fn test_scale_keep_aspect() {
        assert_eq!(ScaleFilter::new(-2, 720).render(), "scale=w=-2:h=720");
    }
}
