//! Static PNG rendering of the four EDA figures.

pub mod charts;
pub mod fonts;
pub mod wordcloud;
