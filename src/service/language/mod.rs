mod model;

pub use model::Language;
