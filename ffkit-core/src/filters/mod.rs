//! Video filter expressions for `-filter:v`.
//!
//! A [`FilterExpr`] is either a single filter (anything implementing
//! [`VideoFilter`]) or a [`FilterChain`] whose members are rendered in order
//! and joined with `,`. Members rendering to an empty string are skipped, so
//! an [`EmptyFilter`] can stand in wherever "no filter" is a valid choice.

mod video;

use std::fmt;
use std::sync::Arc;

pub use video::{
    EmptyFilter, Hqdn3dFilter, IdetFilter, NlmeansFilter, RawFilter, ScaleFilter, YadifFilter,
};

/// Anything that can render itself as an ffmpeg filter expression.
pub trait VideoFilter: fmt::Debug + Send + Sync {
    /// Filter expression as passed to `-filter:v`, or an empty string for a
    /// no-op.
    fn render(&self) -> String;
}

/// A renderable filter expression: one primitive filter or a chain.
#[derive(Debug, Clone)]
pub enum FilterExpr {
    Primitive(Arc<dyn VideoFilter>),
    Chain(FilterChain),
}

impl FilterExpr {
    /// Wraps a primitive filter.
    pub fn new<F: VideoFilter + 'static>(filter: F) -> Self {
        FilterExpr::Primitive(Arc::new(filter))
    }

    #[must_use]
    pub fn render(&self) -> String {
        match self {
            FilterExpr::Primitive(filter) => filter.render(),
            FilterExpr::Chain(chain) => chain.render(),
        }
    }

    /// True when the expression renders to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.render().is_empty()
    }
}

// Two expressions are equal when they produce the same command-line text.
impl PartialEq for FilterExpr {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<FilterChain> for FilterExpr {
    fn from(chain: FilterChain) -> Self {
        FilterExpr::Chain(chain)
    }
}

macro_rules! impl_into_filter_expr {
    ($($filter:ty),* $(,)?) => {
        $(
            impl From<$filter> for FilterExpr {
                fn from(filter: $filter) -> Self {
                    FilterExpr::new(filter)
                }
            }
        )*
    };
}

impl_into_filter_expr!(
    EmptyFilter,
    Hqdn3dFilter,
    IdetFilter,
    NlmeansFilter,
    RawFilter,
    ScaleFilter,
    YadifFilter,
);

/// Ordered sequence of filter expressions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    filters: Vec<FilterExpr>,
}

impl FilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new chain with `filter` appended.
    #[must_use]
    pub fn add_filter(&self, filter: impl Into<FilterExpr>) -> Self {
        let mut filters = self.filters.clone();
        filters.push(filter.into());
        Self { filters }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterExpr> {
        self.filters.iter()
    }

    /// Renders every member, skipping empty renderings, joined with `,`.
    #[must_use]
    pub fn render(&self) -> String {
        self.filters
            .iter()
            .map(FilterExpr::render)
            .filter(|rendered| !rendered.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<F: Into<FilterExpr>> FromIterator<F> for FilterChain {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().map(Into::into).collect(),
        }
    }
}
