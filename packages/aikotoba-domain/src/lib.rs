pub mod answer;
pub mod axes;
pub mod excerpt;
pub mod lexicon;
pub mod similarity;
