//! Placeholder roles derived from the `p:ph` element's `type` attribute.

use phf::phf_map;

/// What a placeholder is for, per the `ST_PlaceholderType` attribute.
///
/// The schema treats an absent `type` as the generic content placeholder,
/// which accepts body text; it maps to [`PlaceholderRole::Body`] here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderRole {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    DateTime,
    Footer,
    SlideNumber,
    Picture,
    /// Chart, table, media and other specialized placeholders.
    Other,
}

static ROLE_BY_TYPE: phf::Map<&'static str, PlaceholderRole> = phf_map! {
    "title" => PlaceholderRole::Title,
    "ctrTitle" => PlaceholderRole::CenterTitle,
    "subTitle" => PlaceholderRole::Subtitle,
    "body" => PlaceholderRole::Body,
    "obj" => PlaceholderRole::Body,
    "dt" => PlaceholderRole::DateTime,
    "ftr" => PlaceholderRole::Footer,
    "sldNum" => PlaceholderRole::SlideNumber,
    "pic" => PlaceholderRole::Picture,
};

impl PlaceholderRole {
    /// Map a raw `type` attribute value; `None` means the attribute was absent.
    pub fn from_ph_type(ph_type: Option<&str>) -> Self {
        match ph_type {
            None => Self::Body,
            Some(t) => ROLE_BY_TYPE.get(t).copied().unwrap_or(Self::Other),
        }
    }

    /// Whether a title-role placeholder: `title` or `ctrTitle`.
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle)
    }

    /// Date, footer and slide-number placeholders inherit their content from
    /// the layout; they are not cloned onto new slides.
    pub fn is_latent(&self) -> bool {
        matches!(self, Self::DateTime | Self::Footer | Self::SlideNumber)
    }
}
