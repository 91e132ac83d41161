//! Title text processing: stopwords and tokenisation.

pub mod stopwords;
pub mod tokenize;
